//! In-memory store fake for tests and local runs without Redis

use super::RecordStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    map: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    failing_ops: HashSet<&'static str>,
}

/// An in-process [`RecordStore`] with the same GET/SET/LREM/RPUSH semantics
/// as Redis, plus per-operation call counters and failure injection.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    gets: AtomicUsize,
    sets: AtomicUsize,
    lrems: AtomicUsize,
    rpushes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call to `op` (one of "get", "set", "lrem",
    /// "rpush") fail with a store error.
    pub async fn fail_on(&self, op: &'static str) {
        self.inner.lock().await.failing_ops.insert(op);
    }

    pub async fn list(&self, name: &str) -> Vec<String> {
        self.inner
            .lock()
            .await
            .lists
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn value(&self, key: &str) -> Option<String> {
        self.inner.lock().await.map.get(key).cloned()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn lrem_calls(&self) -> usize {
        self.lrems.load(Ordering::SeqCst)
    }

    pub fn rpush_calls(&self) -> usize {
        self.rpushes.load(Ordering::SeqCst)
    }

    async fn check(&self, op: &'static str) -> Result<()> {
        if self.inner.lock().await.failing_ops.contains(op) {
            return Err(Error::Store(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check("get").await?;
        Ok(self.inner.lock().await.map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check("set").await?;
        self.inner
            .lock()
            .await
            .map
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn lrem(&self, list: &str, count: isize, value: &str) -> Result<()> {
        self.lrems.fetch_add(1, Ordering::SeqCst);
        self.check("lrem").await?;

        let mut inner = self.inner.lock().await;
        let entries = inner.lists.entry(list.to_string()).or_default();
        // count > 0 removes head-to-tail, < 0 tail-to-head, 0 removes all;
        // the ingest protocol only ever asks for a single occurrence
        let mut remaining = if count == 0 {
            usize::MAX
        } else {
            count.unsigned_abs()
        };
        if count >= 0 {
            entries.retain(|v| {
                if remaining > 0 && v == value {
                    remaining -= 1;
                    false
                } else {
                    true
                }
            });
        } else {
            let mut kept: Vec<String> = Vec::with_capacity(entries.len());
            for v in entries.drain(..).rev() {
                if remaining > 0 && v == value {
                    remaining -= 1;
                } else {
                    kept.push(v);
                }
            }
            kept.reverse();
            *entries = kept;
        }
        Ok(())
    }

    async fn rpush(&self, list: &str, value: &str) -> Result<()> {
        self.rpushes.fetch_add(1, Ordering::SeqCst);
        self.check("rpush").await?;
        self.inner
            .lock()
            .await
            .lists
            .entry(list.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }
}
