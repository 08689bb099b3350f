//! JSON artifact generation.
//!
//! The artifact is the only interface between the collector and the
//! presenter: a pretty-printed UTF-8 JSON array of [`ArticleRecord`]s.
//! Every run replaces the file wholesale; nothing is merged with the
//! previous contents.

use crate::models::ArticleRecord;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `records` and overwrite the file at `path`.
///
/// Missing parent directories are created. The file is written in place,
/// so a failure part-way through can leave it truncated.
///
/// # Returns
///
/// The number of bytes written, or an error if serialization, directory
/// creation, or the write itself fails.
#[instrument(level = "info", skip_all, fields(%path, count = records.len()))]
pub async fn write_artifact(records: &[ArticleRecord], path: &str) -> Result<usize, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create artifact directory");
            return Err(e.into());
        }
    }

    info!("Writing JSON");
    fs::write(path, json.as_bytes()).await?;
    info!(bytes = json.len(), "Wrote JSON artifact");

    Ok(json.len())
}
