//! Read-only procedure catalog.
//!
//! The catalog arrives pre-normalized (fees already numeric, regions already
//! tagged). It is built once, checked for unique codes, and never mutated.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{ProcedureRecord, Region};

/// Ordered, immutable collection of procedures keyed by code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ProcedureRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or duplicate codes.
    pub fn new(records: Vec<ProcedureRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let code = record.code.trim();
            if code.is_empty() {
                return Err(Error::Catalog(format!(
                    "record at position {} has an empty code",
                    position
                )));
            }
            if index.insert(code.to_string(), position).is_some() {
                return Err(Error::Catalog(format!("duplicate code {}", code)));
            }
        }

        Ok(Self { records, index })
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ProcedureRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// Load a JSON array of records from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;

        info!(
            subsystem = "catalog",
            op = "load",
            result_count = catalog.len(),
            "Loaded {} procedures from {}",
            catalog.len(),
            path.display()
        );

        Ok(catalog)
    }

    /// Look up a record by exact code (surrounding whitespace ignored).
    pub fn get(&self, code: &str) -> Option<&ProcedureRecord> {
        self.index.get(code.trim()).map(|&i| &self.records[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code.trim())
    }

    /// All records in load order.
    pub fn records(&self) -> &[ProcedureRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcedureRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records per region. Regions with no records are included as 0.
    pub fn region_counts(&self) -> BTreeMap<Region, usize> {
        let mut counts: BTreeMap<Region, usize> = Region::ALL.iter().map(|r| (*r, 0)).collect();
        for record in &self.records {
            *counts.entry(record.region).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fees;
    use std::io::Write;

    fn record(code: &str, region: Region) -> ProcedureRecord {
        ProcedureRecord {
            code: code.to_string(),
            description: format!("Procedimiento {}", code),
            region,
            complexity: None,
            keywords: None,
            fees: Fees::default(),
        }
    }

    #[test]
    fn test_catalog_lookup_by_code() {
        let catalog = Catalog::new(vec![
            record("MS.01.01", Region::UpperLimb),
            record("PC.05.07", Region::PelvisHip),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("PC.05.07").unwrap().region, Region::PelvisHip);
        assert!(catalog.get(" PC.05.07 ").is_some());
        assert!(catalog.get("PC.99.99").is_none());
        assert!(!catalog.contains("pc.05.07"));
    }

    #[test]
    fn test_catalog_preserves_order() {
        let catalog = Catalog::new(vec![
            record("RO.02.01", Region::Knee),
            record("MS.01.01", Region::UpperLimb),
            record("RO.01.01", Region::Knee),
        ])
        .unwrap();

        let codes: Vec<&str> = catalog.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["RO.02.01", "MS.01.01", "RO.01.01"]);
    }

    #[test]
    fn test_catalog_rejects_duplicate_codes() {
        let result = Catalog::new(vec![
            record("MS.01.01", Region::UpperLimb),
            record("MS.01.01", Region::UpperLimb),
        ]);
        assert!(matches!(result, Err(Error::Catalog(msg)) if msg.contains("MS.01.01")));
    }

    #[test]
    fn test_catalog_rejects_empty_code() {
        let result = Catalog::new(vec![record("  ", Region::Spine)]);
        assert!(matches!(result, Err(Error::Catalog(_))));
    }

    #[test]
    fn test_region_counts_include_empty_regions() {
        let catalog = Catalog::new(vec![
            record("MS.01.01", Region::UpperLimb),
            record("MS.01.02", Region::UpperLimb),
            record("CO.01.01", Region::Spine),
        ])
        .unwrap();

        let counts = catalog.region_counts();
        assert_eq!(counts[&Region::UpperLimb], 2);
        assert_eq!(counts[&Region::Spine], 1);
        assert_eq!(counts[&Region::Knee], 0);
        assert_eq!(counts.len(), 5);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"code": "PP.03.01", "description": "Osteosíntesis de tobillo", "region": "PP",
                 "fees": {{"surgeon": "$80,000"}}}}]"#
        )
        .unwrap();

        let catalog = Catalog::from_json_file(file.path()).unwrap();
        let record = catalog.get("PP.03.01").unwrap();
        assert_eq!(record.fees.surgeon, 80_000.0);
        assert_eq!(record.fees.total, 0.0);
    }

    #[test]
    fn test_from_json_str_rejects_unknown_region() {
        let json = r#"[{"code": "XX.01.01", "description": "x", "region": "XX"}]"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(Error::Serialization(_))
        ));
    }
}
