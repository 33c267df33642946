//! # Loader Collaborator
//!
//! Fetches page content. The mediator awaits the loader at exactly one
//! suspension point per transition and imposes no timeout of its own;
//! retry and timeout policy belong to the loader implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LoadError;

/// A fetched page payload.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Whether the request was redirected.
    pub redirected: bool,
    /// Response body.
    pub body: String,
}

/// Network access for page transitions.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Fetch the content behind `url`.
    async fn load(&self, url: &str) -> Result<LoadedPage, LoadError>;

    /// Whether a load is currently in flight.
    fn is_loading(&self) -> bool;
}

/// Reference loader backed by a reqwest client.
pub struct HttpLoader {
    client: reqwest::Client,
    in_flight: AtomicUsize,
}

impl HttpLoader {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            in_flight: AtomicUsize::new(0),
        }
    }

    async fn fetch(&self, url: &str) -> Result<LoadedPage, LoadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        if !response.status().is_success() {
            return Err(LoadError::Status(status));
        }
        let body = response.text().await?;
        Ok(LoadedPage {
            redirected: final_url != url,
            url: final_url,
            status,
            body,
        })
    }
}

impl Default for HttpLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for HttpLoader {
    async fn load(&self, url: &str) -> Result<LoadedPage, LoadError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(url, "loading page content");
        let result = self.fetch(url).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Err(err) = &result {
            tracing::error!(url, error = %err, "page load failed");
        }
        result
    }

    fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// In-memory loader serving registered fixtures; unknown URLs fail with
/// [`LoadError::Missing`].
#[derive(Default)]
pub struct StaticLoader {
    pages: Mutex<HashMap<String, String>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body for a URL.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        self.pages
            .lock()
            .expect("static loader poisoned")
            .insert(url.into(), body.into());
    }
}

#[async_trait]
impl Loader for StaticLoader {
    async fn load(&self, url: &str) -> Result<LoadedPage, LoadError> {
        let body = self
            .pages
            .lock()
            .expect("static loader poisoned")
            .get(url)
            .cloned();
        match body {
            Some(body) => Ok(LoadedPage {
                url: url.to_string(),
                status: 200,
                redirected: false,
                body,
            }),
            None => Err(LoadError::Missing(url.to_string())),
        }
    }

    fn is_loading(&self) -> bool {
        false
    }
}
