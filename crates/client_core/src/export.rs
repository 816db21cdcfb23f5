//! Downloadable export of a recommendation result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

impl ExportArtifact {
    /// Pretty-prints `payload` with two-space indentation under the dated
    /// file name `blog-recommendations-YYYY-MM-DD.json`.
    pub fn for_date(date: NaiveDate, payload: &serde_json::Value) -> serde_json::Result<Self> {
        Ok(Self {
            file_name: Self::file_name_for(date),
            contents: serde_json::to_string_pretty(payload)?,
        })
    }

    pub fn file_name_for(date: NaiveDate) -> String {
        format!("blog-recommendations-{}.json", date.format("%Y-%m-%d"))
    }

    pub async fn write_into(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create export directory '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.contents.as_bytes())
            .await
            .with_context(|| format!("failed to write export file '{}'", path.display()))?;
        Ok(path)
    }
}
