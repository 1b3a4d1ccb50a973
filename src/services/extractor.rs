//! Field extraction service.
//!
//! Locates each field's label in a record page and walks a fixed relative
//! path from the label to the element holding its value.

use std::collections::HashMap;

use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::models::{FieldDefinition, TraversalRule};
use crate::services::FieldCatalog;

/// Currency marker stripped from the start of values.
const CURRENCY_MARKER: &str = "R$";

/// Outcome of resolving one field in one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// A traversal reached a value
    Found(String),
    /// The label exists but no traversal from it reached a value
    StructureMismatch,
    /// The label text does not appear in the page
    AnchorAbsent,
}

impl Attempt {
    /// Value to store in a record; empty unless found.
    pub fn into_value(self) -> String {
        match self {
            Attempt::Found(value) => value,
            Attempt::StructureMismatch | Attempt::AnchorAbsent => String::new(),
        }
    }
}

/// Extracts field values from record pages.
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    keep_currency_symbol: bool,
}

impl FieldExtractor {
    pub fn new(keep_currency_symbol: bool) -> Self {
        Self {
            keep_currency_symbol,
        }
    }

    /// Extract every selected field. Names missing from the catalog are skipped.
    pub fn extract(
        &self,
        document: &Html,
        catalog: &FieldCatalog,
        selection: &[String],
    ) -> HashMap<String, String> {
        catalog
            .definitions(selection)
            .map(|def| {
                let attempt = self.resolve(document, def);
                if !matches!(attempt, Attempt::Found(_)) {
                    log::debug!("Field '{}': {:?}", def.name, attempt);
                }
                (def.name.clone(), attempt.into_value())
            })
            .collect()
    }

    /// Resolve one field.
    ///
    /// Every occurrence of the label is tried in document order and the last
    /// one that reaches a value wins.
    pub fn resolve(&self, document: &Html, def: &FieldDefinition) -> Attempt {
        let anchors = find_anchors(document, &def.anchor_label);
        if anchors.is_empty() {
            return Attempt::AnchorAbsent;
        }

        anchors
            .into_iter()
            .filter_map(|anchor| traverse(anchor, def.traversal_rule))
            .last()
            .map_or(Attempt::StructureMismatch, |raw| {
                Attempt::Found(self.clean(&raw))
            })
    }

    /// Trim a raw value and drop its leading currency marker.
    pub fn clean(&self, raw: &str) -> String {
        let value = raw.trim();
        if self.keep_currency_symbol {
            return value.to_string();
        }
        value
            .strip_prefix(CURRENCY_MARKER)
            .unwrap_or(value)
            .trim()
            .to_string()
    }
}

/// Elements directly containing a text node equal to `label`, in document order.
///
/// Labels are compared verbatim, whitespace included.
fn find_anchors<'a>(document: &'a Html, label: &str) -> Vec<ElementRef<'a>> {
    document
        .tree
        .root()
        .descendants()
        .filter(|node| matches!(node.value(), Node::Text(text) if &**text == label))
        .filter_map(|node| node.parent().and_then(ElementRef::wrap))
        .collect()
}

/// Walk from an anchor element to the value text. `None` when any step is missing.
fn traverse(anchor: ElementRef<'_>, rule: TraversalRule) -> Option<String> {
    // The anchor element is already one level above the label text.
    let mut current = anchor;
    for _ in 1..rule.levels_up() {
        current = current.parent().and_then(ElementRef::wrap)?;
    }

    let sibling = current.next_siblings().find_map(ElementRef::wrap)?;

    let [outer, inner] = rule.descent();
    let outer = first_descendant(sibling, outer)?;
    let inner = first_descendant(outer, inner)?;

    Some(inner.text().collect())
}

/// First descendant element with the given tag name, excluding `element` itself.
fn first_descendant<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}
