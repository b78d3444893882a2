//! Turns crawled documentation pages into Markdown files on disk.
//!
//! The pipeline extracts the main content of each page, converts it to
//! Markdown and strips boilerplate repeated across pages. It then writes a
//! single stitched document or one file per page, together with the
//! `_index.json` and `manifest.json` manifests.
//!
//! Files are only rewritten when their content changes. The `fetched_at`
//! timestamp in the frontmatter is ignored for that comparison, so an
//! unchanged site produces no diff.
//!
//! ```rust,ignore
//! use docmunch_pipeline::{Frontmatter, render_pages, stitch, write_document};
//!
//! let rendered = render_pages(&result.pages);
//! let meta = Frontmatter::new(start.as_str(), &rendered[0].title, result.platform.to_string());
//! write_document(&stitch(&rendered), Some(Path::new("docs.md")), &meta, false)?;
//! ```
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod frontmatter;
pub mod manifest;
pub mod meta;
pub mod render;
pub mod settings;
pub mod transform;
pub mod writer;

pub use config::{CONFIG_FILENAME, Config, LoadedConfig, SourceConfig, load_config, save_config};
pub use error::PipelineError;
pub use frontmatter::Frontmatter;
pub use manifest::{
    ManifestPageEntry, Placement, RootManifest, RootManifestEntry, SourceManifest, place_pages,
    update_root_manifest,
};
pub use meta::{SiteMeta, extract_site_meta};
pub use render::{RenderedPage, render_page, render_pages, stitch};
pub use settings::CrawlSettings;
pub use writer::write_document;
