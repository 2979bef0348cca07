use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::{error::Result, types::AnalysisResult};

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("pinocchio")
}

/// Directory name for a page URL
pub fn url_key(url: &str) -> String {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Per-URL store of scoring results and saved documents.
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    root: PathBuf,
}

impl AnalysisCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the cache directory for a given URL
    pub fn dir_for(&self, url: &str) -> PathBuf {
        self.root.join(url_key(url))
    }

    pub fn analysis_path(&self, url: &str) -> PathBuf {
        self.dir_for(url).join("analysis.json")
    }

    pub fn document_path(&self, url: &str) -> PathBuf {
        self.dir_for(url).join("document.md")
    }

    /// Cached result for `url`. Unreadable entries are treated as misses.
    pub async fn load(&self, url: &str) -> Option<AnalysisResult> {
        let path = self.analysis_path(url);
        let content = fs::read_to_string(&path).await.ok()?;

        match serde_json::from_str(&content) {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring corrupt cache entry");
                None
            }
        }
    }

    pub async fn store(&self, url: &str, result: &AnalysisResult) -> Result<PathBuf> {
        let path = self.analysis_path(url);
        fs::create_dir_all(self.dir_for(url)).await?;
        let pretty_json = serde_json::to_string_pretty(result)?;
        fs::write(&path, &pretty_json).await?;
        Ok(path)
    }

    pub async fn save_document(&self, url: &str, text: &str) -> Result<PathBuf> {
        let path = self.document_path(url);
        fs::create_dir_all(self.dir_for(url)).await?;
        fs::write(&path, text).await?;
        Ok(path)
    }

    pub async fn invalidate(&self, url: &str) -> Result<()> {
        match fs::remove_file(self.analysis_path(url)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
