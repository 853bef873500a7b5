//! Saving analysis results to disk

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::Result;

/// Writes each analysis to a timestamped session directory
#[derive(Debug, Clone)]
pub struct ReportSaver {
    session_dir: PathBuf,
    report_count: usize,
}

impl ReportSaver {
    /// Create a new ReportSaver
    ///
    /// Creates a session subdirectory with format: `yyyy-mm-dd_HH-MM-SS-mmm`
    ///
    /// # Arguments
    /// * `base_dir` - Base directory for saving reports
    ///
    /// # Returns
    /// A new ReportSaver instance
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let session_start: DateTime<Local> = Local::now();
        let session_name = session_start.format("%Y-%m-%d_%H-%M-%S-%3f").to_string();
        let session_dir = base_dir.as_ref().join(session_name);

        fs::create_dir_all(&session_dir).await?;
        info!("Report session directory: {}", session_dir.display());

        Ok(Self {
            session_dir,
            report_count: 0,
        })
    }

    /// Save one result to the session directory
    ///
    /// Filename format: `insight_NNN_yyyy-mm-dd_HH-MM-SS-mmm.<extension>`
    ///
    /// # Arguments
    /// * `content` - Markdown or HTML text of the result
    /// * `extension` - File extension without the dot
    ///
    /// # Returns
    /// Path to the saved report
    pub async fn save(&mut self, content: &str, extension: &str) -> Result<PathBuf> {
        self.report_count += 1;
        let now: DateTime<Local> = Local::now();

        let filename = format!(
            "insight_{:03}_{}.{}",
            self.report_count,
            now.format("%Y-%m-%d_%H-%M-%S-%3f"),
            extension
        );
        let file_path = self.session_dir.join(filename);

        fs::write(&file_path, content).await?;
        info!("Saved report: {}", file_path.display());

        Ok(file_path)
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn report_count(&self) -> usize {
        self.report_count
    }
}
