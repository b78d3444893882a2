//! Output placement and manifests.
//!
//! Crawled pages are mapped to Markdown files below a source directory. Each
//! file is rewritten only when its content changed. The source directory
//! carries an `_index.json` listing its pages and the output root carries a
//! `manifest.json` listing every source.

use crate::error::PipelineError;
use crate::frontmatter::{Frontmatter, now_rfc3339};
use crate::meta::SiteMeta;
use crate::render::RenderedPage;
use crate::writer::write_if_changed;
use docmunch_crawler::PlatformId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const SOURCE_MANIFEST_FILE: &str = "_index.json";
pub const ROOT_MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPageEntry {
    pub title: String,
    /// Relative to the source directory.
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub entries: Vec<ManifestPageEntry>,
    pub written: usize,
}

/// Relative `.md` path for a page: its URL path with `base_prefix` removed.
///
/// `.html`/`.htm` suffixes are dropped. Empty, `.` and `..` segments are
/// discarded so the result always stays inside the output directory. An
/// empty remainder maps to `index.md`.
pub fn page_path(url: &Url, base_prefix: &str) -> String {
    let path = url.path();
    let remainder = path
        .strip_prefix(base_prefix)
        .or_else(|| path.strip_prefix(base_prefix.trim_end_matches('/')))
        .unwrap_or(path);

    let mut segments: Vec<&str> = remainder
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    if let Some(last) = segments.last_mut() {
        let name = *last;
        *last = name
            .strip_suffix(".html")
            .or_else(|| name.strip_suffix(".htm"))
            .unwrap_or(name);
    }
    segments.retain(|segment| !segment.is_empty());

    if segments.is_empty() {
        "index.md".to_string()
    } else {
        format!("{}.md", segments.join("/"))
    }
}

/// Places rendered pages under `output_dir`, writing only files whose
/// content changed (or every file when `force` is set).
///
/// Pages that map to the same path get `-2`, `-3`, … suffixes in input
/// order; the first page keeps the plain name.
pub fn place_pages(
    pages: &[RenderedPage],
    output_dir: &Path,
    base_prefix: &str,
    force: bool,
) -> Result<Placement, PipelineError> {
    let mut claimed = HashSet::new();
    let mut placement = Placement::default();

    for page in pages {
        let path = claim_path(&mut claimed, page_path(&page.url, base_prefix));
        let rendered = Frontmatter::new(page.url.as_str(), &page.title, page.platform.to_string())
            .render(&page.markdown)?;

        if write_if_changed(&output_dir.join(&path), &rendered, force)? {
            placement.written += 1;
        }
        placement.entries.push(ManifestPageEntry {
            title: page.title.clone(),
            path,
        });
    }

    tracing::info!(
        "Placed {} pages in {} ({} written)",
        placement.entries.len(),
        output_dir.display(),
        placement.written
    );
    Ok(placement)
}

fn claim_path(claimed: &mut HashSet<String>, path: String) -> String {
    if claimed.insert(path.clone()) {
        return path;
    }
    let stem = path.strip_suffix(".md").unwrap_or(&path).to_string();
    (2..)
        .map(|n| format!("{}-{}.md", stem, n))
        .find(|candidate| claimed.insert(candidate.clone()))
        .unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceManifest {
    pub name: String,
    pub url: String,
    pub platform: PlatformId,
    pub fetched_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub pages: Vec<ManifestPageEntry>,
}

impl SourceManifest {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        platform: PlatformId,
        pages: Vec<ManifestPageEntry>,
        meta: &SiteMeta,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            platform,
            fetched_at: now_rfc3339(),
            display_name: meta.display_name.clone(),
            description: meta.description.clone(),
            icon_url: meta.icon_url.clone(),
            pages,
        }
    }

    pub fn write(&self, source_dir: &Path) -> Result<PathBuf, PipelineError> {
        let path = source_dir.join(SOURCE_MANIFEST_FILE);
        write_json(&path, self)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootManifestEntry {
    pub name: String,
    /// Source directory relative to the output root.
    pub path: String,
    pub fetched_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub page_count: usize,
}

impl RootManifestEntry {
    pub fn for_source(manifest: &SourceManifest, path: impl Into<String>) -> Self {
        Self {
            name: manifest.name.clone(),
            path: path.into(),
            fetched_at: manifest.fetched_at.clone(),
            display_name: manifest.display_name.clone(),
            description: manifest.description.clone(),
            icon_url: manifest.icon_url.clone(),
            page_count: manifest.pages.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootManifest {
    #[serde(default)]
    pub sources: Vec<RootManifestEntry>,
}

impl RootManifest {
    /// Loads `manifest.json` from `root`. A missing file is an empty manifest.
    pub fn load(root: &Path) -> Result<Self, PipelineError> {
        let path = root.join(ROOT_MANIFEST_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(PipelineError::Io { path, source }),
        };
        serde_json::from_str(&raw).map_err(|source| PipelineError::Json { path, source })
    }

    /// Replaces the entry with the same name, or appends a new one.
    pub fn upsert(&mut self, entry: RootManifestEntry) {
        match self.sources.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.sources.push(entry),
        }
    }

    pub fn write(&self, root: &Path) -> Result<PathBuf, PipelineError> {
        let path = root.join(ROOT_MANIFEST_FILE);
        write_json(&path, self)?;
        Ok(path)
    }
}

/// Loads the root manifest, upserts `entry` and writes it back.
pub fn update_root_manifest(root: &Path, entry: RootManifestEntry) -> Result<(), PipelineError> {
    let mut manifest = RootManifest::load(root)?;
    manifest.upsert(entry);
    manifest.write(root)?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, format!("{}\n", json)).map_err(PipelineError::io(path))
}
