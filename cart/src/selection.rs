//! Selection set: which cart lines the user intends to check out.

use std::collections::BTreeSet;

use mosi_api_client::{CartKey, CartLine};

/// Ordered set of selected [`CartKey`]s.
///
/// Iteration follows key order, which is also the order bulk removal uses.
/// The set is client-only state and is never sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: BTreeSet<CartKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of every available line.
    pub fn all_available(lines: &[CartLine]) -> Self {
        lines
            .iter()
            .filter(|line| line.available)
            .map(CartLine::key)
            .collect()
    }

    pub fn insert(&mut self, key: CartKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: &CartKey) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &CartKey) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartKey> {
        self.keys.iter()
    }

    /// Snapshot of the keys in iteration order.
    pub fn keys(&self) -> Vec<CartKey> {
        self.keys.iter().cloned().collect()
    }
}

impl FromIterator<CartKey> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = CartKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a CartKey;
    type IntoIter = std::collections::btree_set::Iter<'a, CartKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(id: i64, option: &str, available: bool) -> CartLine {
        CartLine {
            product_id: id,
            option_type: option.to_string(),
            product_name: format!("product {id}"),
            unit_price: 100,
            quantity: 1,
            available,
        }
    }

    #[test]
    fn all_available_skips_unavailable_lines() {
        let lines = vec![line(1, "A", true), line(2, "B", false), line(3, "A", true)];

        let selection = SelectionSet::all_available(&lines);

        assert_eq!(
            selection.keys(),
            vec![CartKey::new(1, "A"), CartKey::new(3, "A")]
        );
    }

    #[test]
    fn iteration_is_key_ordered() {
        let selection: SelectionSet = [
            CartKey::new(5, "B"),
            CartKey::new(1, "Z"),
            CartKey::new(5, "A"),
        ]
        .into_iter()
        .collect();

        let order: Vec<String> = selection.iter().map(ToString::to_string).collect();
        assert_eq!(order, vec!["1-Z", "5-A", "5-B"]);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut selection = SelectionSet::new();
        assert!(selection.insert(CartKey::new(1, "A")));
        assert!(!selection.insert(CartKey::new(1, "A")));
        assert_eq!(selection.len(), 1);
        assert!(selection.remove(&CartKey::new(1, "A")));
        assert!(selection.is_empty());
    }
}
