//! Identifier input.

use std::path::PathBuf;

use csv::ReaderBuilder;

use crate::error::{AppError, Result};
use crate::utils::normalize_identifier;

/// Where the identifiers of a run come from.
#[derive(Debug, Clone)]
pub enum IdentifierSource {
    /// Header-less CSV; the first column of each row is an identifier
    File(PathBuf),
    /// Identifiers given directly
    List(Vec<String>),
}

impl IdentifierSource {
    /// Read identifiers in input order. Blank entries are skipped.
    ///
    /// Values are kept exactly as given; surrounding spaces stay part of
    /// the identifier.
    pub fn load(&self) -> Result<Vec<String>> {
        let raw = match self {
            IdentifierSource::File(path) => {
                let mut reader = ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_path(path)
                    .map_err(|e| {
                        AppError::config(format!(
                            "cannot read identifiers from {}: {}",
                            path.display(),
                            e
                        ))
                    })?;

                let mut ids = Vec::new();
                for row in reader.records() {
                    if let Some(first) = row?.get(0) {
                        ids.push(first.to_string());
                    }
                }
                ids
            }
            IdentifierSource::List(ids) => ids.clone(),
        };

        Ok(raw
            .into_iter()
            .filter(|id| !id.trim().is_empty())
            .collect())
    }

    /// Read identifiers, reducing each to its digits.
    ///
    /// Identifiers left empty by normalization are dropped with a warning.
    pub fn load_normalized(&self) -> Result<Vec<String>> {
        Ok(self
            .load()?
            .into_iter()
            .filter_map(|raw| {
                let id = normalize_identifier(&raw);
                if id.is_empty() {
                    log::warn!("Identifier '{}' has no digits, skipping", raw);
                    None
                } else {
                    Some(id)
                }
            })
            .collect())
    }
}
