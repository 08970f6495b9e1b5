//! # nun-search
//!
//! Two-stage NUN code lookup.
//!
//! This crate provides:
//! - The candidate filter that narrows the catalog to one region
//! - Result resolution of ranked codes against candidates and catalog
//! - [`LookupPipeline`], which runs classification, filtering, ranking and
//!   resolution in sequence and reports a [`SearchOutcome`]
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use nun_search::{Catalog, LookupConfig, LookupPipeline, OpenAIBackend, SearchHistory};
//!
//! let config = LookupConfig::from_env();
//! let catalog = Arc::new(Catalog::from_json_file("nun.json".as_ref())?);
//! let backend = Arc::new(OpenAIBackend::new(config.backend.clone())?);
//! let pipeline = LookupPipeline::from_config(catalog, backend, &config);
//!
//! let mut history = SearchHistory::new();
//! let outcome = pipeline
//!     .search_with_history("fractura de cadera", &mut history)
//!     .await?;
//! ```

pub mod filter;
pub mod pipeline;
pub mod resolution;

// Re-export inference and core types
pub use nun_inference::*;

pub use filter::filter_by_region;
pub use pipeline::{LookupPipeline, SearchOutcome};
pub use resolution::{
    resolve, shortlist_notices, Resolution, ResolvedSuggestion, ShortlistNotice, NOT_IN_CATALOG,
    OUTSIDE_CANDIDATES,
};
