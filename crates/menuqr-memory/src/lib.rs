//! # menuqr-memory
//!
//! In-memory [`Storage`](menuqr_core::storage::Storage) backend. Typed
//! tables behind a `tokio::sync::RwLock` — used for local bring-up and
//! throughout the test suites. Data is lost when the store is dropped.

mod store;

pub use store::MemoryStorage;
