//! Compile Options
//!
//! Loaded from JSON. Missing fields take their defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stylec_style::{AttributeKind, AttributeRegistry, InheritedProperties, DEFAULT_INHERITED};

use crate::error::{CompileError, CompileResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Attributes an element takes from its parent when nothing sets them
    pub inherited_properties: Vec<String>,
    /// Value type of each typed attribute; everything else is a string
    pub attribute_types: BTreeMap<String, AttributeKind>,
    /// Prefix for generated class identifiers
    pub class_prefix: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            inherited_properties: DEFAULT_INHERITED.iter().map(|name| name.to_string()).collect(),
            attribute_types: AttributeRegistry::default_entries(),
            class_prefix: None,
        }
    }
}

impl CompileOptions {
    pub fn from_json_str(json: &str) -> CompileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> CompileResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn registry(&self) -> AttributeRegistry {
        AttributeRegistry::from_map(self.attribute_types.clone())
    }

    pub fn inherited(&self) -> InheritedProperties {
        InheritedProperties::from_names(&self.inherited_properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::from_json_str("{}").unwrap();
        assert_eq!(options, CompileOptions::default());
        assert!(options.inherited().contains("color"));
        assert_eq!(options.registry().kind_of("zIndex"), AttributeKind::Int);
    }

    #[test]
    fn test_overrides() {
        let options = CompileOptions::from_json_str(
            r#"{ "inheritedProperties": ["tint-color"], "attributeTypes": { "border-width": "double" }, "classPrefix": "css" }"#,
        )
        .unwrap();
        assert!(options.inherited().contains("tintColor"));
        assert!(!options.inherited().contains("color"));
        assert_eq!(options.registry().kind_of("borderWidth"), AttributeKind::Double);
        assert_eq!(options.registry().kind_of("zIndex"), AttributeKind::String);
        assert_eq!(options.class_prefix.as_deref(), Some("css"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CompileOptions::from_json_str("{ \"attributeTypes\": { \"a\": \"bool\" } }"),
            Err(CompileError::Config(_))
        ));
    }
}
