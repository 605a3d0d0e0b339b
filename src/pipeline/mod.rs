//! Pipeline coordination
//!
//! One run: discover archive links on the listing page, then one task per
//! link doing download -> unpack -> per-file ingest. A counting semaphore
//! bounds simultaneous downloads only; its permit is released as soon as the
//! download step returns, so unpacking and ingestion of many archives can
//! overlap even though at most N transfers are in flight. Tasks never cancel
//! each other; every failure is logged and the last one is returned.

use crate::config::PipelineConfig;
use crate::crawl::discover_archive_links;
use crate::error::{Error, Result};
use crate::fetch::{archive_path, download};
use crate::ingest::{ingest_file, IngestOutcome};
use crate::store::RecordStore;
use crate::unpack::{extraction_dir, unpack};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Archive links discovered on the page
    pub links: usize,
    /// Downloads that actually hit the network (the rest were cached)
    pub downloaded: usize,
    /// Records appended for the first time
    pub inserted: usize,
    /// Records whose stored blob was replaced
    pub updated: usize,
    /// Records already stored byte-identically
    pub unchanged: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct UnitStats {
    downloaded: bool,
    inserted: usize,
    updated: usize,
    unchanged: usize,
}

/// Coordinates one crawl-download-ingest run.
pub struct Pipeline {
    client: Client,
    store: Arc<dyn RecordStore>,
    download_root: PathBuf,
    max_concurrent_downloads: usize,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            store,
            download_root: config.download_root.clone(),
            max_concurrent_downloads: config.max_concurrent_downloads,
        })
    }

    /// Run the whole pipeline against one listing page.
    ///
    /// Link discovery failure is fatal and aborts the run before anything is
    /// downloaded. After that, each link's task runs to completion or its
    /// own failure independently; if any failed, the last observed error is
    /// returned after all tasks have finished.
    pub async fn run(&self, page_url: &str) -> Result<RunSummary> {
        tokio::fs::create_dir_all(&self.download_root)
            .await
            .map_err(|e| {
                Error::Filesystem(format!("{}: {}", self.download_root.display(), e))
            })?;

        let links = discover_archive_links(&self.client, page_url).await?;
        let mut summary = RunSummary {
            links: links.len(),
            ..RunSummary::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_downloads));
        let mut tasks: JoinSet<std::result::Result<UnitStats, (String, Error)>> = JoinSet::new();

        for link in links {
            let client = self.client.clone();
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&semaphore);
            let download_root = self.download_root.clone();

            tasks.spawn(async move {
                process_link(&client, store.as_ref(), &semaphore, &download_root, &link)
                    .await
                    .map_err(|e| (link, e))
            });
        }

        let mut failures = 0usize;
        let mut last_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(stats)) => {
                    summary.downloaded += stats.downloaded as usize;
                    summary.inserted += stats.inserted;
                    summary.updated += stats.updated;
                    summary.unchanged += stats.unchanged;
                }
                Ok(Err((link, e))) => {
                    warn!("Failed to process {}: {}", link, e);
                    failures += 1;
                    last_error = Some(e);
                }
                Err(e) => {
                    warn!("Worker task aborted: {}", e);
                    failures += 1;
                    last_error = Some(Error::Other(e.to_string()));
                }
            }
        }

        info!(
            "Run complete: {} links, {} downloaded, {} inserted, {} updated, {} unchanged, {} failed",
            summary.links,
            summary.downloaded,
            summary.inserted,
            summary.updated,
            summary.unchanged,
            failures
        );

        match last_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

/// One unit of work: fetch the archive, unpack it, ingest every file.
async fn process_link(
    client: &Client,
    store: &dyn RecordStore,
    semaphore: &Semaphore,
    download_root: &Path,
    link: &str,
) -> Result<UnitStats> {
    let archive = archive_path(download_root, link)?;

    // The permit covers the download only. Unpack and ingest run unbounded
    // so a slow transfer elsewhere never stalls local work.
    let fetched = {
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| Error::Other(e.to_string()))?;
        download(client, link, &archive).await?
    };

    let dest = extraction_dir(&archive).ok_or_else(|| {
        Error::ArchiveFormat(format!("Not an archive path: {}", archive.display()))
    })?;

    let files = {
        let archive = archive.clone();
        let dest = dest.clone();
        tokio::task::spawn_blocking(move || unpack(&archive, &dest))
            .await
            .map_err(|e| Error::Other(e.to_string()))??
    };

    let mut stats = UnitStats {
        downloaded: fetched,
        ..UnitStats::default()
    };
    for file in &files {
        match ingest_file(store, file).await? {
            IngestOutcome::Inserted => stats.inserted += 1,
            IngestOutcome::Updated => stats.updated += 1,
            IngestOutcome::Unchanged => stats.unchanged += 1,
        }
    }
    Ok(stats)
}
