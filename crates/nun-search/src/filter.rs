//! Candidate filter: narrows the catalog to one region.

use nun_core::{Catalog, ProcedureRecord, Region};

/// Every record whose region equals `region`, in catalog order.
///
/// An empty result is valid and distinct from an unknown classification;
/// the pipeline reports it as [`crate::SearchOutcome::NoCandidates`].
pub fn filter_by_region(catalog: &Catalog, region: Region) -> Vec<&ProcedureRecord> {
    catalog.iter().filter(|r| r.region == region).collect()
}
