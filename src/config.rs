//! Runtime configuration for dj-beat-drop.
//! Assembled once from command-line flags and their environment fallbacks;
//! the pipeline itself never reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::cli::Args;
use crate::constants::{DEFAULT_INDEX_URL, DEFAULT_TIMEOUT_SECS};
use crate::materializer::TemplateStore;
use crate::releases::{PypiIndex, VersionResolver};

/// Templates shipped with the crate.
pub const BUNDLED_TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

#[derive(Debug, Clone)]
pub struct Config {
    pub templates_dir: PathBuf,
    pub index_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from(BUNDLED_TEMPLATES_DIR),
            index_url: DEFAULT_INDEX_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        let config = Self {
            templates_dir: args
                .templates_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(BUNDLED_TEMPLATES_DIR)),
            index_url: args.index_url.clone(),
            timeout: Duration::from_secs(args.timeout),
        };
        debug!("{config:?}");
        config
    }

    pub fn template_store(&self) -> TemplateStore {
        TemplateStore::new(&self.templates_dir)
    }

    /// A fresh resolver; its release catalog lives as long as the resolver.
    pub fn resolver(&self) -> VersionResolver<PypiIndex> {
        VersionResolver::new(PypiIndex::new(&self.index_url, self.timeout))
    }
}
