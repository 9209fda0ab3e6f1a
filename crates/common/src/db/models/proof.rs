//! Proof entity

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};

use super::{json_to_list, json_to_optional_list, list_to_json, optional_list_to_json};
use crate::errors::AppError;
use crate::records::{Proof, Record, INITIAL_VERSION};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "proofs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub version: i32,

    #[sea_orm(column_type = "Text")]
    pub theorem_name: String,

    #[sea_orm(column_type = "Text")]
    pub branch: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub proof: Json,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub referenced_definitions: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub referenced_theorems: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Proof {
    type Error = AppError;

    fn try_from(row: Model) -> Result<Self, AppError> {
        Ok(Proof {
            id: row.id,
            version: row.version,
            theorem_name: row.theorem_name,
            branch: row.branch,
            proof: json_to_list(row.proof)?,
            referenced_definitions: json_to_optional_list(row.referenced_definitions)?,
            referenced_theorems: json_to_optional_list(row.referenced_theorems)?,
        })
    }
}

impl ActiveModel {
    pub fn for_insert(record: &Proof) -> Result<Self, AppError> {
        Ok(Self {
            id: NotSet,
            version: Set(INITIAL_VERSION),
            theorem_name: Set(record.theorem_name.clone()),
            branch: Set(record.branch.clone()),
            proof: Set(list_to_json(&record.proof)?),
            referenced_definitions: Set(optional_list_to_json(record.referenced_definitions.as_ref())?),
            referenced_theorems: Set(optional_list_to_json(record.referenced_theorems.as_ref())?),
        })
    }

    pub fn for_update(record: &Proof) -> Result<Self, AppError> {
        Ok(Self {
            id: Unchanged(record.id()),
            version: Set(record.version),
            theorem_name: Set(record.theorem_name.clone()),
            branch: Set(record.branch.clone()),
            proof: Set(list_to_json(&record.proof)?),
            referenced_definitions: Set(optional_list_to_json(record.referenced_definitions.as_ref())?),
            referenced_theorems: Set(optional_list_to_json(record.referenced_theorems.as_ref())?),
        })
    }
}
