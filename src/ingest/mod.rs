//! Idempotent record ingestion
//!
//! Reconciles one record against the store with a GET, then conditionally
//! SET / LREM / RPUSH, keyed on the post URL with the raw XML as the value.
//! The sequence is not transactional: a failure mid-way leaves the key-value
//! map and the list diverged until the next ingestion of the same identifier
//! repairs them, and two tasks racing on the same identifier can interleave.
//! Both are accepted properties of the protocol.

use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::RecordStore;
use std::path::Path;
use tracing::debug;

/// The single well-known list all live record blobs are appended to.
pub const RECORD_LIST_KEY: &str = "NEWS_XML";

/// What an ingestion did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// First time this identifier was seen; one append, no removal
    Inserted,
    /// Content changed; old blob removed, new blob appended
    Updated,
    /// Byte-identical content already stored; no writes at all
    Unchanged,
}

/// Parse and ingest one extracted file.
///
/// Files that are not `.xml` are rejected before any parsing or store
/// traffic happens.
pub async fn ingest_file(store: &dyn RecordStore, path: &Path) -> Result<IngestOutcome> {
    let is_xml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
    if !is_xml {
        return Err(Error::RecordFormat(format!(
            "Not a record file: {}",
            path.display()
        )));
    }

    let record = Record::from_file(path).await?;
    ingest_record(store, &record).await
}

/// Run the dedupe-and-append protocol for one record.
///
/// GET the current blob; if it matches the new one, stop. Otherwise SET the
/// mapping, LREM exactly one occurrence of the old blob when one existed,
/// and RPUSH the new blob. A store failure at any step aborts the rest with
/// no retry and no rollback.
pub async fn ingest_record(store: &dyn RecordStore, record: &Record) -> Result<IngestOutcome> {
    let previous = store.get(&record.post_url).await?;

    match previous {
        Some(ref old) if *old == record.raw => {
            debug!("Record unchanged, skipping: {}", record.post_url);
            Ok(IngestOutcome::Unchanged)
        }
        Some(old) => {
            store.set(&record.post_url, &record.raw).await?;
            store.lrem(RECORD_LIST_KEY, 1, &old).await?;
            store.rpush(RECORD_LIST_KEY, &record.raw).await?;
            debug!("Record updated: {}", record.post_url);
            Ok(IngestOutcome::Updated)
        }
        None => {
            store.set(&record.post_url, &record.raw).await?;
            store.rpush(RECORD_LIST_KEY, &record.raw).await?;
            debug!("Record inserted: {}", record.post_url);
            Ok(IngestOutcome::Inserted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn record(url: &str, raw: &str) -> Record {
        Record {
            post_url: url.to_string(),
            raw: raw.to_string(),
            ..Record::default()
        }
    }

    #[tokio::test]
    async fn test_first_time_ingest_appends_without_removal() {
        let store = MemoryStore::new();
        let outcome = ingest_record(&store, &record("http://x/p1", "<a/>"))
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Inserted);
        assert_eq!(store.lrem_calls(), 0);
        assert_eq!(store.list(RECORD_LIST_KEY).await, vec!["<a/>"]);
        assert_eq!(store.value("http://x/p1").await, Some("<a/>".to_string()));
    }

    #[tokio::test]
    async fn test_reingest_identical_content_is_a_noop() {
        let store = MemoryStore::new();
        let rec = record("http://x/p1", "<a/>");

        ingest_record(&store, &rec).await.unwrap();
        let outcome = ingest_record(&store, &rec).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Unchanged);
        assert_eq!(store.set_calls(), 1);
        assert_eq!(store.rpush_calls(), 1);
        assert_eq!(store.list(RECORD_LIST_KEY).await, vec!["<a/>"]);
    }

    #[tokio::test]
    async fn test_changed_content_replaces_old_blob() {
        let store = MemoryStore::new();
        ingest_record(&store, &record("http://x/p1", "<a/>"))
            .await
            .unwrap();
        let outcome = ingest_record(&store, &record("http://x/p1", "<b/>"))
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Updated);
        assert_eq!(store.value("http://x/p1").await, Some("<b/>".to_string()));
        let list = store.list(RECORD_LIST_KEY).await;
        assert_eq!(list, vec!["<b/>"]);
        assert!(!list.contains(&"<a/>".to_string()));
    }

    #[tokio::test]
    async fn test_update_preserves_other_entries() {
        let store = MemoryStore::new();
        ingest_record(&store, &record("http://x/p1", "<p1a/>"))
            .await
            .unwrap();
        ingest_record(&store, &record("http://x/p2", "<p2/>"))
            .await
            .unwrap();
        ingest_record(&store, &record("http://x/p1", "<p1b/>"))
            .await
            .unwrap();

        assert_eq!(store.list(RECORD_LIST_KEY).await, vec!["<p2/>", "<p1b/>"]);
        assert_eq!(store.value("http://x/p1").await, Some("<p1b/>".to_string()));
        assert_eq!(store.value("http://x/p2").await, Some("<p2/>".to_string()));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_remaining_steps() {
        let store = MemoryStore::new();
        ingest_record(&store, &record("http://x/p1", "<a/>"))
            .await
            .unwrap();

        store.fail_on("lrem").await;
        let err = ingest_record(&store, &record("http://x/p1", "<b/>"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Store(_)));
        // SET ran, RPUSH never did: map and list diverge until re-ingested
        assert_eq!(store.value("http://x/p1").await, Some("<b/>".to_string()));
        assert_eq!(store.list(RECORD_LIST_KEY).await, vec!["<a/>"]);
        assert_eq!(store.rpush_calls(), 1);
    }

    #[tokio::test]
    async fn test_non_xml_file_rejected_before_store_traffic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.html");
        tokio::fs::write(&path, "<html></html>").await.unwrap();

        let store = MemoryStore::new();
        let err = ingest_file(&store, &path).await.unwrap_err();

        assert!(matches!(err, Error::RecordFormat(_)));
        assert_eq!(store.get_calls(), 0);
        assert_eq!(store.set_calls(), 0);
    }

    #[tokio::test]
    async fn test_ingest_file_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("post.xml");
        let xml = "<document><post_url>http://x/p9</post_url></document>";
        tokio::fs::write(&path, xml).await.unwrap();

        let store = MemoryStore::new();
        let outcome = ingest_file(&store, &path).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Inserted);
        assert_eq!(store.value("http://x/p9").await, Some(xml.to_string()));
    }
}
