// src/pipeline/extract.rs

//! Offline extraction from a saved record page.

use std::fs;
use std::path::Path;

use scraper::Html;

use crate::error::Result;
use crate::models::{Config, FieldSelection, Record};
use crate::services::{FieldCatalog, FieldExtractor, PageClass, PageClassifier};
use crate::utils::http::decode_page;

/// Classify a saved page and extract the selected fields from it.
///
/// Error pages produce a blank record, as they do online.
pub fn run_extract(
    config: &Config,
    page: &Path,
    identifier: &str,
    selection: &FieldSelection,
) -> Result<(PageClass, Record)> {
    let html = decode_page(None, &fs::read(page)?);
    let catalog = FieldCatalog::new(config.fields.clone());
    for name in catalog.unknown_fields(selection) {
        log::warn!("Unknown field '{}' ignored", name);
    }
    let selection = catalog.effective_selection(selection);

    let document = Html::parse_document(&html);
    let class = PageClassifier::new().classify(&document);
    let record = match class {
        PageClass::NotFound(marker) => {
            log::info!("{} is an error page: {}", page.display(), marker);
            Record::empty(identifier, &selection)
        }
        PageClass::Valid => {
            let extractor = FieldExtractor::new(config.output.keep_currency_symbol);
            let values = extractor.extract(&document, &catalog, &selection);
            Record::new(identifier, &selection, values)
        }
    };

    Ok((class, record))
}

/// Render a record as a JSON object in column order.
pub fn record_json(record: &Record) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    object.insert(
        "identifier".to_string(),
        serde_json::Value::String(record.identifier.clone()),
    );
    for (name, value) in record.values() {
        object.insert(name.to_string(), serde_json::Value::String(value.to_string()));
    }
    serde_json::Value::Object(object)
}
