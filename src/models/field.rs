// src/models/field.rs

//! Field definitions: what to extract and how to reach it from its label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Relative walk from a label anchor to the node holding its value.
///
/// Every rule climbs from the anchor text to an ancestor element, moves to
/// that ancestor's next element sibling, then descends into emphasized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalRule {
    /// Up two levels, next sibling, `font` then `b`.
    Rule1,
    /// Up two levels, next sibling, `b` then `font`.
    Rule2,
    /// Up three levels, next sibling, `font` then `b`.
    Rule3,
}

impl TraversalRule {
    /// Number of ancestor elements to climb from the anchor's parent element.
    pub fn levels_up(self) -> usize {
        match self {
            TraversalRule::Rule1 | TraversalRule::Rule2 => 2,
            TraversalRule::Rule3 => 3,
        }
    }

    /// Tag names to descend through, outermost first.
    pub fn descent(self) -> [&'static str; 2] {
        match self {
            TraversalRule::Rule1 | TraversalRule::Rule3 => ["font", "b"],
            TraversalRule::Rule2 => ["b", "font"],
        }
    }
}

impl fmt::Display for TraversalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            TraversalRule::Rule1 => 1,
            TraversalRule::Rule2 => 2,
            TraversalRule::Rule3 => 3,
        };
        write!(f, "rule{n}")
    }
}

/// Expected value type. Informational only; values are kept as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeHint {
    #[default]
    Text,
    Number,
    Date,
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeHint::Text => "text",
            TypeHint::Number => "number",
            TypeHint::Date => "date",
        })
    }
}

/// A single extractable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique key, also used as the output column name
    pub name: String,

    /// Label text searched verbatim, embedded whitespace included
    pub anchor_label: String,

    /// How to walk from the label to its value
    #[serde(rename = "rule")]
    pub traversal_rule: TraversalRule,

    /// Expected value type
    #[serde(default, rename = "type")]
    pub type_hint: TypeHint,
}

impl FieldDefinition {
    pub fn new(
        name: impl Into<String>,
        anchor_label: impl Into<String>,
        traversal_rule: TraversalRule,
        type_hint: TypeHint,
    ) -> Self {
        Self {
            name: name.into(),
            anchor_label: anchor_label.into(),
            traversal_rule,
            type_hint,
        }
    }
}

/// Fields requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    /// Every field known to the catalog
    #[default]
    All,
    /// An explicit set of field names
    Named(Vec<String>),
}

impl FromStr for FieldSelection {
    type Err = AppError;

    /// Parse `*` or a comma-separated list of names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "*" {
            return Ok(FieldSelection::All);
        }

        let names: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(AppError::config(format!(
                "'{s}' is not a valid field selection; use '*' or a comma-separated list"
            )));
        }
        Ok(FieldSelection::Named(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_shapes() {
        assert_eq!(TraversalRule::Rule1.levels_up(), 2);
        assert_eq!(TraversalRule::Rule3.levels_up(), 3);
        assert_eq!(TraversalRule::Rule2.descent(), ["b", "font"]);
        assert_eq!(TraversalRule::Rule3.descent(), ["font", "b"]);
    }

    #[test]
    fn test_selection_wildcard() {
        assert_eq!("*".parse::<FieldSelection>().unwrap(), FieldSelection::All);
        assert_eq!(" * ".parse::<FieldSelection>().unwrap(), FieldSelection::All);
    }

    #[test]
    fn test_selection_list() {
        let selection: FieldSelection = "Logradouro, Numero,,Tipo".parse().unwrap();
        assert_eq!(
            selection,
            FieldSelection::Named(vec![
                "Logradouro".to_string(),
                "Numero".to_string(),
                "Tipo".to_string()
            ])
        );
    }

    #[test]
    fn test_selection_empty_rejected() {
        assert!(" , ".parse::<FieldSelection>().is_err());
    }

    #[test]
    fn test_field_definition_from_toml() {
        let def: FieldDefinition = toml::from_str(
            r#"
            name = "Logradouro"
            anchor_label = "Logradouro:"
            rule = "rule1"
            "#,
        )
        .unwrap();
        assert_eq!(def.traversal_rule, TraversalRule::Rule1);
        assert_eq!(def.type_hint, TypeHint::Text);
    }
}
