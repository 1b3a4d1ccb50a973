//! Service layer for the registry scraper.
//!
//! This module contains the business logic for:
//! - Field lookup (`FieldCatalog`)
//! - Error page detection (`PageClassifier`)
//! - Value extraction by label anchoring (`FieldExtractor`)
//! - Per-identifier retrieval with endpoint fallback (`RetrievalStateMachine`)

pub mod catalog;
pub mod classifier;
pub mod extractor;
pub mod retrieval;

pub use catalog::FieldCatalog;
pub use classifier::{ErrorMarker, PageClass, PageClassifier};
pub use extractor::{Attempt, FieldExtractor};
pub use retrieval::{Endpoint, RetrievalOutcome, RetrievalState, RetrievalStateMachine};
