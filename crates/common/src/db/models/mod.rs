//! SeaORM entity models
//!
//! List-valued record fields live in JSONB columns; conversion to and from
//! the record types happens here so repositories only deal with records.

mod definition;
mod proof;

pub use definition::{
    Entity as DefinitionEntity,
    Model as DefinitionRow,
    ActiveModel as DefinitionActiveModel,
    Column as DefinitionColumn,
};

pub use proof::{
    Entity as ProofEntity,
    Model as ProofRow,
    ActiveModel as ProofActiveModel,
    Column as ProofColumn,
};

use crate::errors::Result;
use sea_orm::prelude::Json;

pub(crate) fn list_to_json(list: &[String]) -> Result<Json> {
    Ok(serde_json::to_value(list)?)
}

pub(crate) fn optional_list_to_json(list: Option<&Vec<String>>) -> Result<Option<Json>> {
    list.map(|l| list_to_json(l)).transpose()
}

pub(crate) fn json_to_list(value: Json) -> Result<Vec<String>> {
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn json_to_optional_list(value: Option<Json>) -> Result<Option<Vec<String>>> {
    value.map(json_to_list).transpose()
}
