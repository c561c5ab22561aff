//! Style Resolution
//!
//! Common interface of the indexed and the direct resolver, plus the
//! inheritance fallback both share.

use std::collections::BTreeMap;

use stylec_dom::{ElementTree, NodeId};

use crate::declaration::Declaration;
use crate::properties::InheritedProperties;

/// Resolves the declarations that apply to an element
pub trait StyleResolver {
    /// Winning declaration per attribute among rules matching the element itself
    fn matched_styles(&self, elements: &ElementTree, element: NodeId) -> BTreeMap<String, Declaration>;

    /// Matched styles, plus the parent's resolved value for every inherited
    /// attribute nothing set on the element. Missing parents resolve to nothing.
    fn styles_for_element(
        &self,
        elements: &ElementTree,
        element: NodeId,
        inherited: &InheritedProperties,
    ) -> BTreeMap<String, Declaration> {
        if let Some(data) = elements.element(element) {
            log::trace!("Resolving styles for {} ({})", data, element);
        }
        let mut styles = self.matched_styles(elements, element);

        let missing: Vec<&str> = inherited
            .iter()
            .filter(|name| !styles.contains_key(*name))
            .collect();
        if missing.is_empty() {
            return styles;
        }

        if let Some(parent) = elements.parent(element) {
            let parent_styles = self.styles_for_element(elements, parent, inherited);
            for name in missing {
                if let Some(declaration) = parent_styles.get(name) {
                    styles.insert(name.to_string(), declaration.clone());
                }
            }
        }

        styles
    }
}
