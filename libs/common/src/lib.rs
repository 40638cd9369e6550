//! Common library for the marketplace client
//!
//! This crate provides shared functionality used by the session and
//! marketplace crates: client configuration, durable key/value storage, the
//! HTTP transport to the backend, and the shared error types.

pub mod config;
pub mod error;
pub mod http;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, StorageError, StorageResult};
pub use http::ApiClient;
pub use storage::{DurableStorage, FileStorage, MemoryStorage};

/// Example usage of the transport and storage modules
///
/// ```rust,no_run
/// use common::{ApiClient, ClientConfig, DurableStorage, FileStorage};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::load()?;
///     let client = ApiClient::new(&config)?;
///     let storage = FileStorage::new(&config.session_file);
///     let token = storage.get("jwtToken")?;
///     let profile: serde_json::Value = client.get("/api/users/7", token.as_deref()).await?;
///     println!("Profile: {}", profile);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
