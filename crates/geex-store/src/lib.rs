//! Geex Store - Job history adapters
//!
//! Implementations of the `HistoryStore` port: a JSON file on disk and an
//! in-memory log for tests and dry runs.

pub mod json;
pub mod memory;

pub use json::JsonHistoryStore;
pub use memory::MemoryHistoryStore;
