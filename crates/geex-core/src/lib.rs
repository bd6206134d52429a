//! geex core - Domain models, settings, and job assembly
//!
//! This crate holds the job configuration model, the settings store, the
//! seasonality predicate, the job request builder and the port traits the
//! history store and processing-service client implement.

pub mod builder;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod models;
pub mod ports;
pub mod season;
pub mod submit;

pub use builder::JobBuilder;
pub use config::{LayeredSettings, SettingsStore};
pub use error::{GeexError, Result};
pub use season::is_within_season;
pub use submit::{submit_and_record, SubmissionReceipt};
