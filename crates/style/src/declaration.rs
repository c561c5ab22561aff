//! Cascade declarations and the per-compile order counter

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::properties::NameValue;

/// A declaration stamped with its cascade weight
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub attribute: NameValue,
    /// Packed specificity of the selector it was indexed under
    pub priority: i32,
    /// Compile-wide sequence number
    pub order: i32,
    /// Always equal to `order`
    pub id: i32,
}

impl Declaration {
    pub fn new(attribute: NameValue, priority: i32, order: i32) -> Self {
        Self { attribute, priority, order, id: order }
    }

    pub fn name(&self) -> &str {
        &self.attribute.name
    }

    /// Cascade comparison: priority first, then order
    pub fn cascade_cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Keep the winning declaration per attribute name
pub(crate) fn merge_winner(styles: &mut BTreeMap<String, Declaration>, candidate: &Declaration) {
    match styles.get(candidate.name()) {
        Some(current) if current.cascade_cmp(candidate) != Ordering::Less => {}
        _ => {
            styles.insert(candidate.name().to_string(), candidate.clone());
        }
    }
}

/// Monotonic declaration order. One per compile, threaded through inserts.
#[derive(Debug, Default)]
pub struct OrderCounter {
    next: i32,
}

impl OrderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next order value
    pub fn next(&mut self) -> i32 {
        let order = self.next;
        self.next += 1;
        order
    }

    /// Number of orders handed out so far
    pub fn issued(&self) -> i32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::AttributeValue;

    fn decl(name: &str, value: &str, priority: i32, order: i32) -> Declaration {
        Declaration::new(
            NameValue { name: name.to_string(), value: AttributeValue::string(value) },
            priority,
            order,
        )
    }

    #[test]
    fn test_order_counter() {
        let mut counter = OrderCounter::new();
        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_merge_winner() {
        let mut styles = BTreeMap::new();
        merge_winner(&mut styles, &decl("color", "red", 0x0100, 0));
        merge_winner(&mut styles, &decl("color", "green", 0x0001, 5));
        assert_eq!(styles["color"].attribute.value.string_value, "red");

        merge_winner(&mut styles, &decl("color", "blue", 0x0100, 3));
        assert_eq!(styles["color"].attribute.value.string_value, "blue");
        assert_eq!(styles["color"].id, 3);

        // Seeing the same declaration again changes nothing
        merge_winner(&mut styles, &decl("color", "blue", 0x0100, 3));
        assert_eq!(styles.len(), 1);
    }
}
