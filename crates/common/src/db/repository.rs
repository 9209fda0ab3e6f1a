//! SeaORM-backed record stores
//!
//! One repository per table. Each implements [`RecordStore`] so the CRUD
//! protocol never sees SeaORM types.

use crate::db::models::*;
use crate::db::RecordStore;
use crate::errors::Result;
use crate::records::{Definition, Proof, ProofFilter, Record, Unfiltered};
use async_trait::async_trait;
use std::sync::Arc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

async fn ping(conn: &DatabaseConnection) -> Result<()> {
    conn.execute_unprepared("SELECT 1").await?;
    Ok(())
}

/// Proof rows in the `proofs` table
#[derive(Clone)]
pub struct ProofRepository {
    conn: Arc<DatabaseConnection>,
}

impl ProofRepository {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecordStore<Proof> for ProofRepository {
    async fn get(&self, id: i32) -> Result<Option<Proof>> {
        ProofEntity::find_by_id(id)
            .one(self.conn.as_ref())
            .await?
            .map(Proof::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Proof>> {
        ProofEntity::find()
            .order_by_asc(ProofColumn::Id)
            .all(self.conn.as_ref())
            .await?
            .into_iter()
            .map(Proof::try_from)
            .collect()
    }

    async fn find_by(&self, filter: &ProofFilter) -> Result<Vec<Proof>> {
        let condition = match filter {
            ProofFilter::Branch(branch) => ProofColumn::Branch.eq(branch.as_str()),
            ProofFilter::TheoremName(name) => ProofColumn::TheoremName.eq(name.as_str()),
        };

        ProofEntity::find()
            .filter(condition)
            .order_by_asc(ProofColumn::Id)
            .all(self.conn.as_ref())
            .await?
            .into_iter()
            .map(Proof::try_from)
            .collect()
    }

    async fn save(&self, record: Proof) -> Result<Proof> {
        let row = if record.is_saved() {
            ProofActiveModel::for_update(&record)?.update(self.conn.as_ref()).await?
        } else {
            ProofActiveModel::for_insert(&record)?.insert(self.conn.as_ref()).await?
        };
        Proof::try_from(row)
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let result = ProofEntity::delete_by_id(id).exec(self.conn.as_ref()).await?;
        tracing::debug!(id, rows_affected = result.rows_affected, "Deleted proof rows");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        ping(self.conn.as_ref()).await
    }
}

/// Definition rows in the `definitions` table
#[derive(Clone)]
pub struct DefinitionRepository {
    conn: Arc<DatabaseConnection>,
}

impl DefinitionRepository {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecordStore<Definition> for DefinitionRepository {
    async fn get(&self, id: i32) -> Result<Option<Definition>> {
        DefinitionEntity::find_by_id(id)
            .one(self.conn.as_ref())
            .await?
            .map(Definition::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Definition>> {
        DefinitionEntity::find()
            .order_by_asc(DefinitionColumn::Id)
            .all(self.conn.as_ref())
            .await?
            .into_iter()
            .map(Definition::try_from)
            .collect()
    }

    async fn find_by(&self, filter: &Unfiltered) -> Result<Vec<Definition>> {
        match *filter {}
    }

    async fn save(&self, record: Definition) -> Result<Definition> {
        let row = if record.is_saved() {
            DefinitionActiveModel::for_update(&record)?.update(self.conn.as_ref()).await?
        } else {
            DefinitionActiveModel::for_insert(&record)?.insert(self.conn.as_ref()).await?
        };
        Definition::try_from(row)
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let result = DefinitionEntity::delete_by_id(id).exec(self.conn.as_ref()).await?;
        tracing::debug!(id, rows_affected = result.rows_affected, "Deleted definition rows");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        ping(self.conn.as_ref()).await
    }
}
