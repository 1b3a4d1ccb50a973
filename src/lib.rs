// src/lib.rs

//! SPIUnet Scraper Library
//!
//! Retrieves property records from the SPIUnet registry by RIP: a retrieval
//! state machine loads each record page (falling back to a second endpoint
//! on timeout), classifies it and extracts label-anchored fields into CSV
//! rows.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
