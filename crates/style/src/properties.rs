//! Attribute Definitions
//!
//! Maps stylesheet property names onto element attribute names, decides
//! which attributes inherit, and types declaration values through the
//! attribute registry.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use stylec_css::Declaration as CssDeclaration;

/// Convert a property name to its attribute name (`font-size` -> `fontSize`)
pub fn camel_case(property: &str) -> String {
    let mut result = String::with_capacity(property.len());
    for (i, segment) in property.split('-').enumerate() {
        if i == 0 {
            result.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Attributes inherited from the parent element when nothing sets them
pub const DEFAULT_INHERITED: &[&str] = &[
    "color",
    "cursor",
    "direction",
    "font",
    "fontFamily",
    "fontSize",
    "fontStyle",
    "fontWeight",
    "letterSpacing",
    "lineHeight",
    "textAlign",
    "textDecoration",
    "textTransform",
    "visibility",
    "whiteSpace",
    "wordSpacing",
];

/// The inheritable allow-list
#[derive(Debug, Clone)]
pub struct InheritedProperties {
    names: FxHashSet<String>,
}

impl InheritedProperties {
    /// Build from property or attribute names; names are camel-cased
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| camel_case(n.as_ref())).collect(),
        }
    }

    /// No attribute inherits
    pub fn none() -> Self {
        Self { names: FxHashSet::default() }
    }

    /// Check if an attribute is inherited
    pub fn contains(&self, attribute: &str) -> bool {
        self.names.contains(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }
}

impl Default for InheritedProperties {
    fn default() -> Self {
        Self::from_names(DEFAULT_INHERITED)
    }
}

/// Registered value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    #[default]
    String,
    Int,
    Double,
}

/// A declaration value typed by the registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeValue {
    pub string_value: String,
    pub int_value: i32,
    pub double_value: f64,
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self { string_value: value.into(), ..Default::default() }
    }

    pub fn int(value: i32) -> Self {
        Self { int_value: value, ..Default::default() }
    }

    pub fn double(value: f64) -> Self {
        Self { double_value: value, ..Default::default() }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.string_value.is_empty() {
            f.write_str(&self.string_value)
        } else if self.int_value != 0 {
            write!(f, "{}", self.int_value)
        } else {
            write!(f, "{}", self.double_value)
        }
    }
}

/// An attribute name with its typed value
#[derive(Debug, Clone, PartialEq)]
pub struct NameValue {
    pub name: String,
    pub value: AttributeValue,
}

/// Maps attribute names to value types. Unregistered attributes are strings.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRegistry {
    kinds: BTreeMap<String, AttributeKind>,
}

impl AttributeRegistry {
    /// Registry with no typed attributes
    pub fn empty() -> Self {
        Self { kinds: BTreeMap::new() }
    }

    /// Built-in typed attributes
    pub fn default_entries() -> BTreeMap<String, AttributeKind> {
        [
            ("zIndex", AttributeKind::Int),
            ("numberOfLines", AttributeKind::Int),
            ("opacity", AttributeKind::Double),
            ("flexGrow", AttributeKind::Double),
            ("flexShrink", AttributeKind::Double),
            ("aspectRatio", AttributeKind::Double),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect()
    }

    pub fn from_map(kinds: BTreeMap<String, AttributeKind>) -> Self {
        let kinds = kinds.into_iter().map(|(name, kind)| (camel_case(&name), kind)).collect();
        Self { kinds }
    }

    pub fn register(&mut self, attribute: impl Into<String>, kind: AttributeKind) {
        self.kinds.insert(attribute.into(), kind);
    }

    pub fn kind_of(&self, attribute: &str) -> AttributeKind {
        self.kinds.get(attribute).copied().unwrap_or_default()
    }

    /// Type a raw value. A value that does not parse as its registered
    /// kind is carried as a string.
    pub fn value_for(&self, attribute: &str, raw: &str) -> AttributeValue {
        let kind = self.kind_of(attribute);
        let parsed = match kind {
            AttributeKind::String => return AttributeValue::string(raw),
            AttributeKind::Int => raw.trim().parse::<i32>().ok().map(AttributeValue::int),
            AttributeKind::Double => raw.trim().parse::<f64>().ok().map(AttributeValue::double),
        };
        parsed.unwrap_or_else(|| {
            log::warn!("'{}' is not a valid {:?} value for '{}'", raw, kind, attribute);
            AttributeValue::string(raw)
        })
    }

    /// Convert parsed declarations into attribute name/value pairs
    pub fn convert(&self, declarations: &[CssDeclaration]) -> Vec<NameValue> {
        declarations
            .iter()
            .map(|decl| {
                let name = camel_case(&decl.property);
                let value = self.value_for(&name, &decl.value);
                NameValue { name, value }
            })
            .collect()
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self { kinds: Self::default_entries() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("abc-def"), "abcDef");
        assert_eq!(camel_case("color"), "color");
        assert_eq!(camel_case("border-top-left-radius"), "borderTopLeftRadius");
        assert_eq!(camel_case("-webkit-x"), "WebkitX");
        assert_eq!(camel_case("a--b"), "aB");
        assert_eq!(camel_case("fontSize"), "fontSize");
    }

    #[test]
    fn test_inherited_properties() {
        let inherited = InheritedProperties::default();
        assert!(inherited.contains("color"));
        assert!(inherited.contains("fontFamily"));
        assert!(!inherited.contains("width"));
        assert!(!inherited.contains("backgroundColor"));
    }

    #[test]
    fn test_inherited_names_are_camel_cased() {
        let inherited = InheritedProperties::from_names(["text-color", "font"]);
        assert!(inherited.contains("textColor"));
        assert!(inherited.contains("font"));
        assert!(!inherited.contains("text-color"));
        assert!(InheritedProperties::none().is_empty());
    }

    #[test]
    fn test_registry_typing() {
        let registry = AttributeRegistry::default();
        assert_eq!(registry.value_for("zIndex", "3"), AttributeValue::int(3));
        assert_eq!(registry.value_for("opacity", "0.5"), AttributeValue::double(0.5));
        assert_eq!(registry.value_for("width", "50px"), AttributeValue::string("50px"));
        // Not a number: carried as a string
        assert_eq!(registry.value_for("zIndex", "auto"), AttributeValue::string("auto"));
    }

    #[test]
    fn test_registry_from_map_camel_cases() {
        let mut map = BTreeMap::new();
        map.insert("max-lines".to_string(), AttributeKind::Int);
        let registry = AttributeRegistry::from_map(map);
        assert_eq!(registry.kind_of("maxLines"), AttributeKind::Int);
        assert_eq!(registry.kind_of("zIndex"), AttributeKind::String);
    }

    #[test]
    fn test_convert_declarations() {
        let registry = AttributeRegistry::default();
        let converted = registry.convert(&[
            CssDeclaration::new("background-color", "#ffffff"),
            CssDeclaration::new("z-index", "2"),
        ]);
        assert_eq!(converted[0].name, "backgroundColor");
        assert_eq!(converted[0].value, AttributeValue::string("#ffffff"));
        assert_eq!(converted[1].name, "zIndex");
        assert_eq!(converted[1].value, AttributeValue::int(2));
    }

    #[test]
    fn test_attribute_kind_serde() {
        let kind: AttributeKind = serde_json::from_str("\"double\"").unwrap();
        assert_eq!(kind, AttributeKind::Double);
        assert_eq!(serde_json::to_string(&AttributeKind::Int).unwrap(), "\"int\"");
    }
}
