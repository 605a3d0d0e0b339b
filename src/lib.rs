//! harvester - archive crawling and idempotent record ingestion
//!
//! This crate provides:
//! - Archive link discovery on a listing page
//! - Idempotent zip download and extraction with on-disk cache markers
//! - XML record parsing
//! - A dedupe-and-append ingestion protocol against a Redis-backed store
//! - A coordinator running the whole pipeline with bounded download fan-out

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod unpack;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunSummary};
