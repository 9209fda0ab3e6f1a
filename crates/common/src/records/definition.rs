//! Definition record

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::merge::{overlay_list, overlay_optional_list, overlay_text};
use super::{
    is_blank, is_empty_list, is_supplied_blank, reject, Record, RecordPatch, INITIAL_VERSION,
    UNSAVED_ID,
};

/// A named mathematical definition with its statement lines and notation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default)]
    pub id: i32,

    #[serde(default)]
    pub version: i32,

    pub name: String,

    /// Ordered statement lines, stored as JSON
    pub definition: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation: Option<Vec<String>>,
}

/// Definitions are only ever looked up by id, so no filter can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unfiltered {}

impl Record for Definition {
    type Patch = DefinitionPatch;
    type Filter = Unfiltered;

    const RESOURCE: &'static str = "definitions";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    fn matches(&self, filter: &Unfiltered) -> bool {
        match *filter {}
    }
}

/// Client payload for creating or partially updating a definition.
///
/// `id` and `version` are accepted on the wire and ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionPatch {
    #[validate(length(min = 1, max = 200, message = "Must be between 1 and 200 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation: Option<Vec<String>>,
}

impl RecordPatch<Definition> for DefinitionPatch {
    fn validate_insert(&self) -> Result<(), ValidationErrors> {
        let mut missing = Vec::new();
        if is_blank(&self.name) {
            missing.push(("name", "A name must be specified"));
        }
        if is_empty_list(&self.definition) {
            missing.push(("definition", "At least one (1) definition must be specified"));
        }
        reject(self.validate(), "required", &missing)
    }

    fn validate_update(&self) -> Result<(), ValidationErrors> {
        let mut blank = Vec::new();
        if is_supplied_blank(&self.name) {
            blank.push(("name", "A name must not be blank"));
        }
        reject(self.validate(), "blank", &blank)
    }

    fn into_record(self) -> Definition {
        Definition {
            id: UNSAVED_ID,
            version: INITIAL_VERSION,
            name: self.name.unwrap_or_default(),
            definition: self.definition.unwrap_or_default(),
            notation: self.notation,
        }
    }

    fn merge_onto(&self, existing: &Definition) -> Definition {
        let mut merged = existing.clone();
        overlay_text(&mut merged.name, &self.name);
        overlay_list(&mut merged.definition, &self.definition);
        overlay_optional_list(&mut merged.notation, &self.notation);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_requires_name_and_definition() {
        let errors = DefinitionPatch::default().validate_insert().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("definition"));
    }

    #[test]
    fn test_blank_name_rejected_on_insert() {
        let patch = DefinitionPatch {
            name: Some("   ".into()),
            definition: Some(vec!["a set with no elements".into()]),
            notation: None,
        };
        let errors = patch.validate_insert().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(!errors.field_errors().contains_key("definition"));
    }

    #[test]
    fn test_name_longer_than_200_rejected() {
        let patch = DefinitionPatch {
            name: Some("n".repeat(201)),
            ..Default::default()
        };
        assert!(patch.validate_update().is_err());

        let patch = DefinitionPatch {
            name: Some("n".repeat(200)),
            ..Default::default()
        };
        assert!(patch.validate_update().is_ok());
    }

    #[test]
    fn test_blank_name_rejected_on_update() {
        let patch = DefinitionPatch {
            name: Some("   ".into()),
            ..Default::default()
        };
        let errors = patch.validate_update().unwrap_err();
        assert_eq!(errors.field_errors()["name"][0].code, "blank");
    }

    #[test]
    fn test_update_accepts_missing_fields() {
        assert!(DefinitionPatch::default().validate_update().is_ok());
    }

    #[test]
    fn test_into_record_is_unsaved() {
        let patch = DefinitionPatch {
            name: Some("Empty set".into()),
            definition: Some(vec!["a set with no elements".into()]),
            notation: Some(vec!["\\emptyset".into()]),
        };
        assert!(patch.validate_insert().is_ok());

        let record = patch.into_record();
        assert!(!record.is_saved());
        assert_eq!(record.version, INITIAL_VERSION);
        assert_eq!(record.notation, Some(vec!["\\emptyset".to_string()]));
    }

    #[test]
    fn test_wire_format_ignores_client_identity() {
        let patch: DefinitionPatch = serde_json::from_str(
            r#"{"id": 12, "version": 9, "name": "Group", "definition": ["a set with an operation"]}"#,
        )
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some("Group"));

        let record = patch.into_record();
        assert_eq!(record.id, UNSAVED_ID);
        assert_eq!(record.version, INITIAL_VERSION);
    }

    #[test]
    fn test_serializes_camel_case_without_absent_notation() {
        let definition = Definition {
            id: 1,
            version: 0,
            name: "Group".into(),
            definition: vec!["a set with an operation".into()],
            notation: None,
        };
        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["name"], "Group");
        assert!(json.get("notation").is_none());
    }
}
