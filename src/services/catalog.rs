//! Field catalog service.
//!
//! Holds the ordered set of extractable fields and resolves caller
//! selections against it.

use crate::models::{FieldDefinition, FieldSelection};

/// Ordered collection of field definitions, keyed by name.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<FieldDefinition>,
}

impl FieldCatalog {
    /// Create a catalog from definitions. Later duplicates of a name are ignored.
    pub fn new(definitions: Vec<FieldDefinition>) -> Self {
        let mut fields: Vec<FieldDefinition> = Vec::with_capacity(definitions.len());
        for def in definitions {
            if fields.iter().any(|f| f.name == def.name) {
                log::warn!("Duplicate field '{}' ignored", def.name);
                continue;
            }
            fields.push(def);
        }
        Self { fields }
    }

    /// Look up a field by name.
    pub fn lookup(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All field names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// All definitions in catalog order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Requested names that exist in the catalog, in catalog order.
    ///
    /// The result depends only on the requested set, never on its order
    /// or repetitions.
    pub fn effective_selection(&self, requested: &FieldSelection) -> Vec<String> {
        match requested {
            FieldSelection::All => self.names().map(str::to_string).collect(),
            FieldSelection::Named(names) => self
                .names()
                .filter(|known| names.iter().any(|n| n == known))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Requested names that the catalog does not know, deduplicated.
    pub fn unknown_fields(&self, requested: &FieldSelection) -> Vec<String> {
        match requested {
            FieldSelection::All => Vec::new(),
            FieldSelection::Named(names) => {
                let mut unknown: Vec<String> = Vec::new();
                for name in names {
                    if self.lookup(name).is_none() && !unknown.contains(name) {
                        unknown.push(name.clone());
                    }
                }
                unknown
            }
        }
    }

    /// Definitions for an effective selection, skipping unknown names.
    pub fn definitions<'a>(
        &'a self,
        selection: &'a [String],
    ) -> impl Iterator<Item = &'a FieldDefinition> + 'a {
        selection.iter().filter_map(|name| self.lookup(name))
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::new(crate::models::Config::default().fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TraversalRule, TypeHint};

    fn catalog_ab() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldDefinition::new("A", "A:", TraversalRule::Rule1, TypeHint::Text),
            FieldDefinition::new("B", "B:", TraversalRule::Rule2, TypeHint::Number),
        ])
    }

    fn named(names: &[&str]) -> FieldSelection {
        FieldSelection::Named(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_wildcard_selects_everything_in_order() {
        let catalog = catalog_ab();
        assert_eq!(
            catalog.effective_selection(&FieldSelection::All),
            vec!["A", "B"]
        );
    }

    #[test]
    fn test_intersection_is_order_independent() {
        let catalog = catalog_ab();
        let expected = vec!["A".to_string(), "B".to_string()];
        assert_eq!(catalog.effective_selection(&named(&["A", "B", "Z"])), expected);
        assert_eq!(catalog.effective_selection(&named(&["Z", "B", "A"])), expected);
        assert_eq!(catalog.effective_selection(&named(&["B", "A", "B"])), expected);
    }

    #[test]
    fn test_unknown_selection_is_empty() {
        let catalog = catalog_ab();
        assert!(catalog.effective_selection(&named(&["X", "Y"])).is_empty());
        assert_eq!(catalog.unknown_fields(&named(&["X", "A", "X"])), vec!["X"]);
        assert!(catalog.unknown_fields(&FieldSelection::All).is_empty());
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog_ab();
        assert_eq!(
            catalog.lookup("B").map(|f| f.traversal_rule),
            Some(TraversalRule::Rule2)
        );
        assert!(catalog.lookup("b").is_none());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let catalog = FieldCatalog::new(vec![
            FieldDefinition::new("A", "first", TraversalRule::Rule1, TypeHint::Text),
            FieldDefinition::new("A", "second", TraversalRule::Rule3, TypeHint::Text),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("A").unwrap().anchor_label, "first");
    }

    #[test]
    fn test_default_catalog() {
        let catalog = FieldCatalog::default();
        assert_eq!(catalog.len(), 21);
        assert_eq!(
            catalog.lookup("ConstruidaAreaU").unwrap().traversal_rule,
            TraversalRule::Rule3
        );
    }
}
