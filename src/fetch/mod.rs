//! Idempotent archive downloads
//!
//! An archive's local path is a pure function of its source URL, and the
//! presence of that path is the "already downloaded" marker. No manifest is
//! kept: re-running the pipeline skips anything already on disk, including a
//! file left behind by an interrupted transfer.

use crate::error::{Error, Result};
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Derive the local destination for a source URL: `<root>/<basename>`.
pub fn archive_path(download_root: &Path, url: &str) -> Result<PathBuf> {
    let basename = url.rsplit('/').next().unwrap_or_default();
    if basename.is_empty() {
        return Err(Error::Filesystem(format!(
            "Cannot derive a file name from URL: {}",
            url
        )));
    }
    Ok(download_root.join(basename))
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// Returns `true` when a network transfer actually happened, `false` on a
/// cache hit. Both are success; the distinction only feeds logging.
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<bool> {
    let exists = tokio::fs::try_exists(dest)
        .await
        .map_err(|e| Error::Filesystem(format!("{}: {}", dest.display(), e)))?;
    if exists {
        debug!("Already downloaded, skipping: {}", dest.display());
        return Ok(false);
    }

    debug!("Downloading {} -> {}", url, dest.display());

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network(format!("HTTP {}: {}", status, url)));
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Filesystem(format!("{}: {}", parent.display(), e)))?;
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| Error::Filesystem(format!("{}: {}", dest.display(), e)))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Network(format!("{}: {}", url, e)))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    info!("Downloaded {}", dest.display());
    Ok(true)
}
