//! Definition entity

use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};

use super::{json_to_list, json_to_optional_list, list_to_json, optional_list_to_json};
use crate::errors::AppError;
use crate::records::{Definition, Record, INITIAL_VERSION};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "definitions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub version: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub definition: Json,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub notation: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Definition {
    type Error = AppError;

    fn try_from(row: Model) -> Result<Self, AppError> {
        Ok(Definition {
            id: row.id,
            version: row.version,
            name: row.name,
            definition: json_to_list(row.definition)?,
            notation: json_to_optional_list(row.notation)?,
        })
    }
}

impl ActiveModel {
    /// Insert form: the id is left to the database sequence.
    pub fn for_insert(record: &Definition) -> Result<Self, AppError> {
        Ok(Self {
            id: NotSet,
            version: Set(INITIAL_VERSION),
            name: Set(record.name.clone()),
            definition: Set(list_to_json(&record.definition)?),
            notation: Set(optional_list_to_json(record.notation.as_ref())?),
        })
    }

    /// Update form: every content column is written, keyed by the record id.
    pub fn for_update(record: &Definition) -> Result<Self, AppError> {
        Ok(Self {
            id: Unchanged(record.id()),
            version: Set(record.version),
            name: Set(record.name.clone()),
            definition: Set(list_to_json(&record.definition)?),
            notation: Set(optional_list_to_json(record.notation.as_ref())?),
        })
    }
}
