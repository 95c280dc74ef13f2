//! Access to the blob store hosting the datasets.
use crate::Error;
use log::debug;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A read-only store of files addressed by URL.
pub trait Remote: Send + Sync {
    /// Whether the store reports `url` as present.
    fn exists(&self, url: &str) -> Result<bool, Error>;

    /// The full body stored at `url`.
    fn get(&self, url: &str) -> Result<Vec<u8>, Error>;
}

/// [`Remote`] over plain HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
}

impl HttpRemote {
    /// Wrap an already configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Remote for HttpRemote {
    fn exists(&self, url: &str) -> Result<bool, Error> {
        let response = self.client.head(url).send()?;
        debug!("HEAD {url}: {}", response.status());
        Ok(response.status().is_success())
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, Error> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;
        debug!("GET {url}: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// [`Remote`] backed by a map, for tests and offline use.
///
/// Clones share the same files and request log, so a clone kept by the caller
/// can inspect what a client did.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    files: HashMap<String, Vec<u8>>,
    requests: Vec<String>,
}

impl MemoryRemote {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` under `url`.
    pub fn insert(&self, url: impl Into<String>, body: Vec<u8>) {
        self.lock().files.insert(url.into(), body);
    }

    /// Every URL passed to [`Remote::exists`] or [`Remote::get`], in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Remote for MemoryRemote {
    fn exists(&self, url: &str) -> Result<bool, Error> {
        let mut inner = self.lock();
        inner.requests.push(url.to_string());
        Ok(inner.files.contains_key(url))
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, Error> {
        let mut inner = self.lock();
        inner.requests.push(url.to_string());
        inner.files.get(url).cloned().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{url} not found"),
            ))
        })
    }
}
