//! # nun-core
//!
//! Core types, traits, and abstractions for NUN procedure code lookup.
//!
//! This crate provides the foundational data structures that the other
//! crates depend on:
//! - The closed [`Region`] enumeration and [`ProcedureRecord`] model
//! - The read-only [`Catalog`] with code lookup
//! - The caller-owned [`SearchHistory`] rolling log
//! - The [`GenerationBackend`] trait implemented by inference backends

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use catalog::Catalog;
pub use error::{BackendFailure, Error, Result};
pub use history::{HistoryEntry, SearchHistory};
pub use models::*;
pub use traits::*;
