//! mucher-core: Question banks, variant descriptions, and answer-sheet scoring.
//!
//! This crate holds the data model and the two engines the rest of mucher
//! builds on: the bank parser feeding the `much` randomizer, and the scorer
//! reading transcribed answer sheets back.

pub mod bank;
pub mod config;
pub mod description;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod report;
pub mod results;
pub mod scoring;
pub mod traits;
pub mod workbook;
