//! Guardian analyzer - turns documents and URLs into localized risk reports
//!
//! The pipeline encodes user files into inline request parts, composes a
//! localized analysis prompt, walks an ordered model fallback chain against
//! a remote generation service, and validates the JSON report it gets back.
//! Every failure surfaces as one classified, human-readable error.

pub mod ai;
pub mod app;
pub mod encode;
pub mod error;
pub mod extract;
pub mod models;
pub mod prompts;
pub mod schema;

pub use app::Analyzer;
pub use error::{Error, Result};
