// src/models/record.rs

//! Output record: one row per processed identifier.

use std::collections::HashMap;

/// One row of output.
///
/// Always carries exactly one value per selected field, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The identifier as supplied by the caller
    pub identifier: String,

    /// `(field name, value)` pairs in selection order
    values: Vec<(String, String)>,
}

impl Record {
    /// Build a record from extracted values.
    ///
    /// Fields of `selection` missing from `extracted` get an empty value;
    /// extra keys in `extracted` are ignored.
    pub fn new(
        identifier: impl Into<String>,
        selection: &[String],
        mut extracted: HashMap<String, String>,
    ) -> Self {
        let values = selection
            .iter()
            .map(|name| {
                let value = extracted.remove(name).unwrap_or_default();
                (name.clone(), value)
            })
            .collect();

        Self {
            identifier: identifier.into(),
            values,
        }
    }

    /// Record with every selected field empty.
    pub fn empty(identifier: impl Into<String>, selection: &[String]) -> Self {
        Self::new(identifier, selection, HashMap::new())
    }

    /// Value for a field, `None` if the field was not selected.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate `(field name, value)` pairs in selection order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every selected field is empty.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|(_, value)| value.is_empty())
    }

    /// Number of fields with a non-empty value.
    pub fn filled_count(&self) -> usize {
        self.values.iter().filter(|(_, v)| !v.is_empty()).count()
    }
}
