//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod history;
pub mod submitter;

pub use history::HistoryStore;
pub use submitter::TaskSubmitter;
