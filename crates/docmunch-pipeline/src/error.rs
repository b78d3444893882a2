use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("I/O error at {path}: {source}")]
    #[diagnostic(code(docmunch::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    #[diagnostic(code(docmunch::config::yaml))]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to render frontmatter: {0}")]
    #[diagnostic(code(docmunch::frontmatter))]
    Frontmatter(#[source] serde_yaml::Error),

    #[error("Invalid JSON in {path}: {source}")]
    #[diagnostic(code(docmunch::manifest::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No .docmunch.yaml found")]
    #[diagnostic(
        code(docmunch::config::not_found),
        help("Run `docmunch add <url>` first.")
    )]
    ConfigNotFound,

    #[error("Source \"{name}\" not found in config")]
    #[diagnostic(
        code(docmunch::config::source_not_found),
        help("Run `docmunch list` to see configured sources.")
    )]
    SourceNotFound { name: String },

    #[error("No sources configured")]
    #[diagnostic(
        code(docmunch::config::no_sources),
        help("Run `docmunch add <url>` to add one.")
    )]
    NoSources,
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PipelineError::Io { path, source }
    }
}
