//! Record store layer
//!
//! Provides:
//! - The `RecordStore` trait the CRUD protocol is written against
//! - SeaORM entity models and repositories (PostgreSQL, JSONB columns)
//! - An in-memory store for tests and local runs
//! - Connection management

mod memory;
pub mod models;
mod repository;

pub use memory::MemoryStore;
pub use repository::{DefinitionRepository, ProofRepository};

use crate::config::{DatabaseConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::records::{Definition, Proof, Record};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Persistence for one record kind.
///
/// The store owns authoritative state. `save` inserts when the record has
/// never been persisted (assigning the id and the initial version) and
/// overwrites the row otherwise. `delete` is idempotent.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<R>>;

    async fn list(&self) -> Result<Vec<R>>;

    async fn find_by(&self, filter: &R::Filter) -> Result<Vec<R>>;

    async fn save(&self, record: R) -> Result<R>;

    async fn delete(&self, id: i32) -> Result<()>;

    /// Round-trip check used by the readiness check
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// The stores backing both record kinds
#[derive(Clone)]
pub struct Stores {
    pub proofs: Arc<dyn RecordStore<Proof>>,
    pub definitions: Arc<dyn RecordStore<Definition>>,
}

impl Stores {
    /// Open the backend selected in configuration
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            StoreBackend::Postgres => {
                let conn = Arc::new(connect(config).await?);
                Ok(Self {
                    proofs: Arc::new(ProofRepository::new(Arc::clone(&conn))),
                    definitions: Arc::new(DefinitionRepository::new(conn)),
                })
            }
            StoreBackend::Memory => {
                info!("Using in-memory record store");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            proofs: Arc::new(MemoryStore::<Proof>::new()),
            definitions: Arc::new(MemoryStore::<Definition>::new()),
        }
    }
}

/// Create a connection pool from configuration
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    info!("Connecting to database...");

    let mut options = ConnectOptions::new(&config.url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(true);

    let conn = Database::connect(options)
        .await
        .map_err(|e| AppError::DatabaseConnection {
            message: format!("Failed to connect: {}", e),
        })?;

    info!("Database connection established");
    Ok(conn)
}
