//! Source fetching

use crate::error::{KpiError, KpiResult};
use std::collections::HashMap;
use std::path::PathBuf;

/// Returns the raw bytes behind a source locator
pub trait SourceFetcher {
    fn fetch(&self, locator: &str) -> KpiResult<Vec<u8>>;
}

/// Reads locators as filesystem paths, optionally relative to a base directory
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base_dir: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: Some(base_dir.into()) }
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(locator),
            None => PathBuf::from(locator),
        }
    }
}

impl SourceFetcher for FileFetcher {
    fn fetch(&self, locator: &str) -> KpiResult<Vec<u8>> {
        let path = self.resolve(locator);
        std::fs::read(&path).map_err(|e| KpiError::Source {
            locator: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Serves fixed byte blobs by locator
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    sources: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, locator: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.sources.insert(locator.to_string(), bytes.into());
        self
    }
}

impl SourceFetcher for MemoryFetcher {
    fn fetch(&self, locator: &str) -> KpiResult<Vec<u8>> {
        self.sources.get(locator).cloned().ok_or_else(|| KpiError::Source {
            locator: locator.to_string(),
            reason: "not found".to_string(),
        })
    }
}
