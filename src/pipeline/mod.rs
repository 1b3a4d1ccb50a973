//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Log in and scrape identifiers into a CSV file
//! - `run_extract`: Extract fields from a saved page
//! - `run_validate`: Check a configuration file

pub mod extract;
pub mod scrape;
pub mod validate;

pub use extract::{record_json, run_extract};
pub use scrape::{ScrapeJob, ScrapeReport, run_scrape, scrape_identifiers, select_fields};
pub use validate::run_validate;
