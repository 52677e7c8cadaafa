// Implementations of the user store.

pub mod http_store;
pub mod in_memory;
pub mod sqlite_store;

pub use http_store::HttpUserStore;
pub use in_memory::InMemoryUserStore;
pub use sqlite_store::SqliteUserStore;

use crate::core::profiles::UserStore;
use anyhow::{bail, Context};
use std::sync::Arc;

/// Pick a store implementation from a URL:
///
/// - `http://…` / `https://…` -> profile service
/// - `sqlite:…` -> local SQLite file
/// - `memory:` -> process-local, nothing persisted
pub async fn connect(url: &str) -> anyhow::Result<Arc<dyn UserStore>> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let store = HttpUserStore::new(url).context("Failed to build HTTP user store client")?;
        tracing::info!(url, "Using HTTP user store");
        return Ok(Arc::new(store));
    }
    if url.starts_with("sqlite:") {
        let store = SqliteUserStore::new(url)
            .await
            .with_context(|| format!("Failed to open SQLite user store at {}", url))?;
        tracing::info!(url, "Using SQLite user store");
        return Ok(Arc::new(store));
    }
    if url == "memory:" {
        tracing::warn!("Using in-memory user store; profiles are lost on restart");
        return Ok(Arc::new(InMemoryUserStore::new()));
    }
    bail!("Unsupported USER_STORE_URL `{}`", url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_and_http_urls_are_recognised() {
        assert!(connect("memory:").await.is_ok());
        assert!(connect("http://127.0.0.1:5000").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_schemes_are_rejected() {
        let err = connect("redis://localhost").await.err().unwrap();
        assert!(err.to_string().contains("Unsupported"));
    }
}
