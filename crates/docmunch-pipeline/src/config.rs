//! Project configuration stored in `.docmunch.yaml`.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".docmunch.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub crawl: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default)]
    pub output: String,
}

fn default_version() -> u32 {
    1
}

fn default_output_dir() -> String {
    ".ai/docs".to_string()
}

fn default_max_depth() -> u32 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            output_dir: default_output_dir(),
            sources: Vec::new(),
        }
    }
}

impl SourceConfig {
    /// Crawled sources whose output is not a `.md` file get one file per
    /// page in a directory.
    pub fn is_directory_output(&self) -> bool {
        !self.output.ends_with(".md")
    }
}

impl Config {
    /// Adds `source`, replacing any existing source with the same name.
    pub fn add_source(&mut self, source: SourceConfig) {
        match self.sources.iter_mut().find(|s| s.name == source.name) {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    /// Sources to operate on: the named one, or all of them.
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&SourceConfig>, PipelineError> {
        match name {
            Some(name) => self
                .sources
                .iter()
                .find(|s| s.name == name)
                .map(|s| vec![s])
                .ok_or_else(|| PipelineError::SourceNotFound {
                    name: name.to_string(),
                }),
            None if self.sources.is_empty() => Err(PipelineError::NoSources),
            None => Ok(self.sources.iter().collect()),
        }
    }
}

/// A configuration together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

impl LoadedConfig {
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Absolute output root: `output_dir` resolved against the config file's
    /// directory.
    pub fn output_root(&self) -> PathBuf {
        self.dir().join(&self.config.output_dir)
    }

    pub fn save(&self) -> Result<(), PipelineError> {
        save_config(&self.config, &self.path)
    }
}

/// Walks up from `start` looking for `.docmunch.yaml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

/// Loads the nearest config above `start`, if any.
pub fn load_config(start: &Path) -> Result<Option<LoadedConfig>, PipelineError> {
    find_config(start)
        .map(|path| {
            load_config_file(&path).map(|config| LoadedConfig {
                config,
                path: path.clone(),
            })
        })
        .transpose()
}

pub fn load_config_file(path: &Path) -> Result<Config, PipelineError> {
    let raw = fs::read_to_string(path).map_err(PipelineError::io(path))?;
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| PipelineError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_config(config: &Config, path: &Path) -> Result<(), PipelineError> {
    let yaml = serde_yaml::to_string(config).map_err(|source| PipelineError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, yaml).map_err(PipelineError::io(path))
}
