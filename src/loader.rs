//! # Document Loading
//!
//! Verification methods and controller documents are dereferenced through a
//! caller-supplied [`DocumentLoader`]. How documents are fetched (network,
//! cache, static fixtures) is entirely up to the implementer.

use std::future::Future;

use serde_json::Value;

/// Loads the JSON document identified by a URL.
pub trait DocumentLoader: Send + Sync {
    /// Load the document at `url`.
    ///
    /// Returns `Ok(None)` when no document exists for the URL. The URL never
    /// contains a fragment.
    fn load(&self, url: &str) -> impl Future<Output = anyhow::Result<Option<Value>>> + Send;
}

impl<T: DocumentLoader> DocumentLoader for &T {
    fn load(&self, url: &str) -> impl Future<Output = anyhow::Result<Option<Value>>> + Send {
        (**self).load(url)
    }
}
