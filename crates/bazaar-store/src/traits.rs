//! Store traits.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Result, Version, Versioned};

/// Key-value view over a replicated append-only log.
///
/// Reads return the latest locally replicated value, which may lag
/// writes made by other peers.
#[async_trait]
pub trait ReplicatedStore: Send + Sync {
    /// Returns the current value of `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Versioned>>;

    /// Writes `value` under `key` unconditionally.
    async fn put(&self, key: &str, value: serde_json::Value) -> Result<Version>;

    /// Writes `value` only if the current version of `key` is `expected`.
    ///
    /// `None` means the key must be absent.
    async fn put_if(
        &self,
        key: &str,
        value: serde_json::Value,
        expected: Option<&Version>,
    ) -> Result<Version>;

    /// Returns every key with its current value, ordered by key.
    async fn scan(&self) -> Result<Vec<(String, Versioned)>>;
}

#[async_trait]
impl<T: ReplicatedStore + ?Sized> ReplicatedStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Versioned>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<Version> {
        (**self).put(key, value).await
    }

    async fn put_if(
        &self,
        key: &str,
        value: serde_json::Value,
        expected: Option<&Version>,
    ) -> Result<Version> {
        (**self).put_if(key, value, expected).await
    }

    async fn scan(&self) -> Result<Vec<(String, Versioned)>> {
        (**self).scan().await
    }
}
