use crate::error::PipelineError;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const DOCMUNCH_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Field that changes on every run and is ignored when comparing output.
const VOLATILE_FIELD: &str = "fetched_at:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub source: String,
    pub fetched_at: String,
    pub platform: String,
    pub title: String,
    pub docmunch_version: String,
}

impl Frontmatter {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            fetched_at: now_rfc3339(),
            platform: platform.into(),
            title: title.into(),
            docmunch_version: DOCMUNCH_VERSION.to_string(),
        }
    }

    /// Renders the YAML block followed by the Markdown body.
    pub fn render(&self, body: &str) -> Result<String, PipelineError> {
        let yaml = serde_yaml::to_string(self).map_err(PipelineError::Frontmatter)?;
        Ok(format!("---\n{}---\n\n{}\n", yaml, body.trim_end()))
    }
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Blanks the volatile timestamp inside the leading frontmatter block so two
/// renders of the same content compare equal.
pub fn normalize_volatile(content: &str) -> String {
    let mut in_frontmatter = false;

    content
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if line == "---" {
                in_frontmatter = index == 0;
                return line.to_string();
            }
            if in_frontmatter && line.starts_with(VOLATILE_FIELD) {
                VOLATILE_FIELD.to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
