//! Proof record

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::merge::{overlay_list, overlay_optional_list, overlay_text};
use super::{
    is_blank, is_empty_list, is_supplied_blank, reject, Record, RecordPatch, INITIAL_VERSION,
    UNSAVED_ID,
};

/// A proof of a named theorem within a branch of mathematics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(default)]
    pub id: i32,

    #[serde(default)]
    pub version: i32,

    pub theorem_name: String,

    pub branch: String,

    /// Ordered proof steps, stored as JSON
    pub proof: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_definitions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_theorems: Option<Vec<String>>,
}

/// Column lookups supported for proofs. Values are normalized on
/// construction so "set_theory", "set-theory" and "set theory" build the
/// same filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofFilter {
    Branch(String),
    TheoremName(String),
}

impl ProofFilter {
    pub fn branch(raw: &str) -> Self {
        ProofFilter::Branch(normalize_filter(raw))
    }

    pub fn theorem_name(raw: &str) -> Self {
        ProofFilter::TheoremName(normalize_filter(raw))
    }
}

/// Replace `_` and `-` with spaces so URL-friendly filters match stored text.
pub fn normalize_filter(raw: &str) -> String {
    raw.replace(['_', '-'], " ")
}

impl Record for Proof {
    type Patch = ProofPatch;
    type Filter = ProofFilter;

    const RESOURCE: &'static str = "proofs";

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

    fn matches(&self, filter: &ProofFilter) -> bool {
        match filter {
            ProofFilter::Branch(branch) => self.branch == *branch,
            ProofFilter::TheoremName(name) => self.theorem_name == *name,
        }
    }
}

/// Client payload for creating or partially updating a proof.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProofPatch {
    #[validate(length(min = 1, max = 200, message = "Must be between 1 and 200 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theorem_name: Option<String>,

    #[validate(length(min = 1, max = 512, message = "Must be between 1 and 512 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_definitions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_theorems: Option<Vec<String>>,
}

impl RecordPatch<Proof> for ProofPatch {
    fn validate_insert(&self) -> Result<(), ValidationErrors> {
        let mut missing = Vec::new();
        if is_blank(&self.theorem_name) {
            missing.push(("theorem_name", "A theorem name must be specified"));
        }
        if is_blank(&self.branch) {
            missing.push(("branch", "A branch must be specified"));
        }
        if is_empty_list(&self.proof) {
            missing.push(("proof", "At least one (1) proof step must be specified"));
        }
        reject(self.validate(), "required", &missing)
    }

    fn validate_update(&self) -> Result<(), ValidationErrors> {
        let mut blank = Vec::new();
        if is_supplied_blank(&self.theorem_name) {
            blank.push(("theorem_name", "A theorem name must not be blank"));
        }
        if is_supplied_blank(&self.branch) {
            blank.push(("branch", "A branch must not be blank"));
        }
        reject(self.validate(), "blank", &blank)
    }

    fn into_record(self) -> Proof {
        Proof {
            id: UNSAVED_ID,
            version: INITIAL_VERSION,
            theorem_name: self.theorem_name.unwrap_or_default(),
            branch: self.branch.unwrap_or_default(),
            proof: self.proof.unwrap_or_default(),
            referenced_definitions: self.referenced_definitions,
            referenced_theorems: self.referenced_theorems,
        }
    }

    fn merge_onto(&self, existing: &Proof) -> Proof {
        let mut merged = existing.clone();
        overlay_text(&mut merged.theorem_name, &self.theorem_name);
        overlay_text(&mut merged.branch, &self.branch);
        overlay_list(&mut merged.proof, &self.proof);
        overlay_optional_list(&mut merged.referenced_definitions, &self.referenced_definitions);
        overlay_optional_list(&mut merged.referenced_theorems, &self.referenced_theorems);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization() {
        let expected = ProofFilter::Branch("set theory".into());
        assert_eq!(ProofFilter::branch("set_theory"), expected);
        assert_eq!(ProofFilter::branch("set-theory"), expected);
        assert_eq!(ProofFilter::branch("set theory"), expected);
        assert_eq!(normalize_filter("law_of-cosines"), "law of cosines");
    }

    #[test]
    fn test_matches_by_column() {
        let proof = Proof {
            id: 1,
            version: 0,
            theorem_name: "Law of cosines".into(),
            branch: "Trigonometry".into(),
            proof: vec!["c^2 = a^2 + b^2 - 2ab cos(C)".into()],
            referenced_definitions: None,
            referenced_theorems: None,
        };

        assert!(proof.matches(&ProofFilter::branch("Trigonometry")));
        assert!(proof.matches(&ProofFilter::theorem_name("Law_of_cosines")));
        assert!(!proof.matches(&ProofFilter::branch("Algebra")));
    }

    #[test]
    fn test_insert_validation_lists_every_violation() {
        let patch = ProofPatch {
            theorem_name: Some("t".repeat(201)),
            ..Default::default()
        };
        let errors = patch.validate_insert().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("theorem_name"));
        assert!(fields.contains_key("branch"));
        assert!(fields.contains_key("proof"));
    }

    #[test]
    fn test_supplied_blank_text_rejected_on_update() {
        let patch = ProofPatch {
            branch: Some(" \t".into()),
            proof: Some(vec!["new step".into()]),
            ..Default::default()
        };
        let errors = patch.validate_update().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("branch"));
        assert!(!fields.contains_key("theorem_name"));

        let patch = ProofPatch {
            proof: Some(vec!["new step".into()]),
            ..Default::default()
        };
        assert!(patch.validate_update().is_ok());
    }

    #[test]
    fn test_valid_insert() {
        let patch = ProofPatch {
            theorem_name: Some("Pythagorean theorem".into()),
            branch: Some("Euclidean geometry".into()),
            proof: Some(vec!["a^2+b^2=c^2".into()]),
            ..Default::default()
        };
        assert!(patch.validate_insert().is_ok());
        assert_eq!(patch.into_record().id, UNSAVED_ID);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let patch: ProofPatch = serde_json::from_str(
            r#"{"theoremName": "Thales", "referencedTheorems": ["Inscribed angle"]}"#,
        )
        .unwrap();
        assert_eq!(patch.theorem_name.as_deref(), Some("Thales"));
        assert_eq!(patch.referenced_theorems, Some(vec!["Inscribed angle".to_string()]));
    }
}
