//! Pandamonium Common Library
//!
//! Shared code for the persistence API and the service tier:
//! - Proof and definition records, their patches and validation
//! - The record merge engine used by partial updates
//! - The record store abstraction with SeaORM and in-memory backends
//! - Error types and handling
//! - Configuration management
//! - Metrics and timers

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod records;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{MemoryStore, RecordStore};
pub use errors::{AppError, Result};
pub use records::{Definition, DefinitionPatch, Proof, ProofFilter, ProofPatch, Record, RecordPatch};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
