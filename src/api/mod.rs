//! Document store client
//!
//! The [`DocumentStore`] trait is the only way the core reaches persisted
//! projects and responses. [`HttpDocumentStore`] talks to the storage server;
//! [`MemoryDocumentStore`] keeps everything in process.

pub mod client;
pub mod constants;
pub mod memory;
pub mod models;
pub mod resilience;
pub mod store;

pub use client::HttpDocumentStore;
pub use memory::MemoryDocumentStore;
pub use models::response_key;
pub use resilience::{ResilienceConfig, RetryConfig, RetryPolicy, RetryableError};
pub use store::{DocumentStore, StoreError, StoredDocument};
