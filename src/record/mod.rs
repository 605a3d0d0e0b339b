//! Structured record parsing
//!
//! Each extracted file holds one XML `<document>` describing a forum post.
//! The raw bytes are kept verbatim alongside the parsed fields: the post URL
//! is the dedupe key and the raw blob is the equality test the ingest
//! protocol runs against the store.

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A parsed forum post record.
///
/// Every field is opaque text carried through to the store; only `post_url`
/// participates in the ingestion protocol. Missing elements deserialize to
/// empty strings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename = "document", default)]
pub struct Record {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub forum: String,
    pub forum_title: String,
    pub discussion_title: String,
    pub language: String,
    pub gmt_offset: String,
    pub topic_url: String,
    pub topic_text: String,
    pub spam_score: String,
    pub post_num: String,
    pub post_id: String,
    pub post_url: String,
    pub post_date: String,
    pub post_time: String,
    pub username: String,
    pub post: String,
    pub signature: String,
    pub external_links: String,
    pub country: String,
    pub main_image: String,

    /// Source file the record was parsed from
    #[serde(skip)]
    pub path: PathBuf,

    /// Verbatim file contents, the store's content blob
    #[serde(skip)]
    pub raw: String,
}

impl Record {
    /// Parse a record out of raw XML, retaining the blob verbatim.
    pub fn from_xml(path: &Path, raw: String) -> Result<Self> {
        let mut record: Record = quick_xml::de::from_str(&raw)?;
        record.path = path.to_path_buf();
        record.raw = raw;
        Ok(record)
    }

    /// Read and parse a record file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_xml(path, raw)
    }
}
