//! Class Export Map
//!
//! Identifiers generated for every class name a stylesheet uses, so host
//! code can refer to classes by name.

use std::collections::{BTreeMap, BTreeSet};

use stylec_style::{camel_case, SelectorTerm};

/// Class name -> generated identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassExportMap {
    entries: BTreeMap<String, String>,
}

impl ClassExportMap {
    /// Build the map for every class any of the terms mentions
    pub fn from_terms<'a>(terms: impl IntoIterator<Item = &'a SelectorTerm>, prefix: Option<&str>) -> Self {
        let classes: BTreeSet<&str> = terms.into_iter().flat_map(|term| term.all_classes()).collect();
        Self::from_classes(classes, prefix)
    }

    /// Build the map for a set of class names, visited in sorted order
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>, prefix: Option<&str>) -> Self {
        let classes: BTreeSet<&str> = classes.into_iter().collect();
        let mut taken = BTreeSet::new();
        let mut entries = BTreeMap::new();

        for class in classes {
            let base = identifier(class, prefix);
            let mut candidate = base.clone();
            let mut suffix = 2;
            while taken.contains(&candidate) {
                candidate = format!("{}{}", base, suffix);
                suffix += 1;
            }
            taken.insert(candidate.clone());
            entries.insert(class.to_string(), candidate);
        }

        Self { entries }
    }

    pub fn get(&self, class: &str) -> Option<&str> {
        self.entries.get(class).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(class, ident)| (class.as_str(), ident.as_str()))
    }
}

/// Camel-case the class, drop characters an identifier cannot hold and
/// apply the prefix
fn identifier(class: &str, prefix: Option<&str>) -> String {
    let camel: String = camel_case(class)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    let mut ident = match prefix {
        Some(prefix) if !prefix.is_empty() => {
            let mut chars = camel.chars();
            let mut ident = prefix.to_string();
            if let Some(first) = chars.next() {
                ident.extend(first.to_uppercase());
                ident.push_str(chars.as_str());
            }
            ident
        }
        _ => camel,
    };

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        let map = ClassExportMap::from_classes(["nav-item", "active", "2col", "a.b"], None);
        assert_eq!(map.get("nav-item"), Some("navItem"));
        assert_eq!(map.get("active"), Some("active"));
        assert_eq!(map.get("2col"), Some("_2col"));
        assert_eq!(map.get("a.b"), Some("a_b"));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let map = ClassExportMap::from_classes(["nav-item", "navItem", "nav--item"], None);
        // Sorted: nav--item, nav-item, navItem
        assert_eq!(map.get("nav--item"), Some("navItem"));
        assert_eq!(map.get("nav-item"), Some("navItem2"));
        assert_eq!(map.get("navItem"), Some("navItem3"));
    }

    #[test]
    fn test_prefix() {
        let map = ClassExportMap::from_classes(["title", "sub-title"], Some("css"));
        assert_eq!(map.get("title"), Some("cssTitle"));
        assert_eq!(map.get("sub-title"), Some("cssSubTitle"));
    }
}
