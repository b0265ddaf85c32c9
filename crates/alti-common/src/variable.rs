//! Variable descriptors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Variables exposed by a source, keyed by name.
pub type VariableMap = BTreeMap<String, Variable>;

/// A named, described field of an altimetry product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            unit: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Case-insensitive substring match against the name or the description.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_name_case_insensitive() {
        let var = Variable::new("longitude").with_description("Longitude coordinate");
        assert!(var.matches("LoNgItUde"));
        assert!(var.matches("coord"));
        assert!(!var.matches("___"));
    }

    #[test]
    fn test_matches_without_description() {
        let var = Variable::new("sla_filtered");
        assert!(var.matches("SLA"));
        assert!(!var.matches("coordinate"));
    }

    #[test]
    fn test_serde_skips_missing_fields() {
        let json = serde_json::to_string(&Variable::new("a")).unwrap();
        assert_eq!(json, r#"{"name":"a"}"#);

        let var: Variable =
            serde_json::from_str(r#"{"name":"swh","unit":"m"}"#).unwrap();
        assert_eq!(var.unit.as_deref(), Some("m"));
        assert!(var.description.is_none());
    }
}
