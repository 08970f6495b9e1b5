//! Domain models for procedure lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

// =============================================================================
// REGION
// =============================================================================

/// Anatomical region partitioning the NUN catalog.
///
/// This enumeration is closed: a classification outside these five codes is
/// treated as unknown rather than trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// MS: clavicle, humerus, elbow, forearm, wrist, hand, fingers.
    #[serde(rename = "MS")]
    UpperLimb,
    /// CO: cervical, dorsal, lumbar, sacral spine.
    #[serde(rename = "CO")]
    Spine,
    /// PC: proximal femur, acetabulum, sacrum.
    #[serde(rename = "PC")]
    PelvisHip,
    /// RO: patella, femoral condyles, tibial plateau, cruciate ligaments.
    #[serde(rename = "RO")]
    Knee,
    /// PP: tibia, fibula, ankle, talus, calcaneus, metatarsals, phalanges.
    #[serde(rename = "PP")]
    LegFoot,
}

impl Region {
    /// Every region, in catalog prefix order.
    pub const ALL: [Region; 5] = [
        Region::UpperLimb,
        Region::Spine,
        Region::PelvisHip,
        Region::Knee,
        Region::LegFoot,
    ];

    /// Two-letter NUN prefix.
    pub fn code(&self) -> &'static str {
        match self {
            Region::UpperLimb => "MS",
            Region::Spine => "CO",
            Region::PelvisHip => "PC",
            Region::Knee => "RO",
            Region::LegFoot => "PP",
        }
    }

    /// Human-readable region name as used in the nomenclator.
    pub fn label(&self) -> &'static str {
        match self {
            Region::UpperLimb => "Miembro Superior",
            Region::Spine => "Columna",
            Region::PelvisHip => "Pelvis y Cadera",
            Region::Knee => "Rodilla",
            Region::LegFoot => "Pierna y Pie",
        }
    }

    /// Anatomical structures covered by the region.
    pub fn anatomy(&self) -> &'static str {
        match self {
            Region::UpperLimb => "clavícula, húmero, codo, antebrazo, muñeca, mano, dedos",
            Region::Spine => "cervical, dorsal, lumbar, sacra",
            Region::PelvisHip => "fémur proximal, acetábulo, sacro",
            Region::Knee => "patela, cóndilos femorales, platillos tibiales, ligamentos cruzados",
            Region::LegFoot => {
                "tibia, peroné, tobillo, astrágalo, calcáneo, metatarsianos, falanges"
            }
        }
    }

    /// Parse a region code leniently (surrounding whitespace, any case).
    ///
    /// Returns `None` for anything outside the five codes.
    pub fn from_code(code: &str) -> Option<Region> {
        let code = code.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::from_code(s).ok_or_else(|| {
            Error::InvalidInput(format!(
                "unknown region '{}', expected one of MS, CO, PC, RO, PP",
                s
            ))
        })
    }
}

// =============================================================================
// PROCEDURE RECORD
// =============================================================================

/// Fee schedule attached to a procedure. Values are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fees {
    /// Surgeon fee.
    #[serde(default, deserialize_with = "lenient_fee")]
    pub surgeon: f64,
    /// Assistant fee.
    #[serde(default, deserialize_with = "lenient_fee")]
    pub assistant: f64,
    /// Total fee.
    #[serde(default, deserialize_with = "lenient_fee")]
    pub total: f64,
}

impl Fees {
    /// True when no fee is recorded.
    pub fn is_empty(&self) -> bool {
        self.surgeon == 0.0 && self.assistant == 0.0 && self.total == 0.0
    }
}

/// Parse a fee value that may still carry currency formatting.
///
/// Strips `$`, `,` and `"`; anything unparsable, negative, or non-finite
/// becomes zero.
pub fn parse_fee(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '"') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().map(sanitize_fee).unwrap_or(0.0)
}

fn sanitize_fee(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

fn lenient_fee<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFee {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<RawFee>::deserialize(deserializer)? {
        Some(RawFee::Number(n)) => sanitize_fee(n),
        Some(RawFee::Text(s)) => parse_fee(&s),
        Some(RawFee::Other(_)) | None => 0.0,
    })
}

/// A single billable procedure in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    /// Unique dotted code, e.g. `PC.05.07`.
    pub code: String,
    pub description: String,
    pub region: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default)]
    pub fees: Fees,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Outcome of the region classification stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// `None` means the region is unknown and the query stops here.
    pub region: Option<Region>,
    /// Confidence score 0.0-1.0
    pub confidence: f32,
    pub rationale: String,
}

impl ClassificationResult {
    /// Creates a classification, clamping confidence into range.
    pub fn new(region: Region, confidence: f32, rationale: impl Into<String>) -> Self {
        Self {
            region: Some(region),
            confidence: clamp_confidence(confidence),
            rationale: rationale.into(),
        }
    }

    /// The explicit unknown-region outcome.
    pub fn unknown() -> Self {
        Self {
            region: None,
            confidence: 0.0,
            rationale: String::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.region.is_none()
    }
}

// =============================================================================
// SUGGESTION
// =============================================================================

/// A ranked, justified candidate code.
///
/// The code is whatever the ranking capability returned; it is not
/// guaranteed to exist in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub code: String,
    pub rationale: String,
    /// Confidence score 0.0-1.0
    pub confidence: f32,
}

impl Suggestion {
    pub fn new(code: impl Into<String>, rationale: impl Into<String>, confidence: f32) -> Self {
        Self {
            code: code.into(),
            rationale: rationale.into(),
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Clamp a model-reported confidence into [0, 1]; NaN becomes 0.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_codes_roundtrip() {
        for region in Region::ALL {
            assert_eq!(Region::from_code(region.code()), Some(region));
        }
    }

    #[test]
    fn test_region_from_code_is_lenient() {
        assert_eq!(Region::from_code(" pc "), Some(Region::PelvisHip));
        assert_eq!(Region::from_code("Ms"), Some(Region::UpperLimb));
    }

    #[test]
    fn test_region_rejects_unknown_codes() {
        assert_eq!(Region::from_code("XX"), None);
        assert_eq!(Region::from_code(""), None);
        assert_eq!(Region::from_code("Cadera"), None);
        assert!("HO".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_serializes_as_code() {
        let json = serde_json::to_string(&Region::Knee).unwrap();
        assert_eq!(json, "\"RO\"");
        let region: Region = serde_json::from_str("\"PP\"").unwrap();
        assert_eq!(region, Region::LegFoot);
    }

    #[test]
    fn test_parse_fee_currency_formats() {
        assert_eq!(parse_fee("$1,234.50"), 1234.5);
        assert_eq!(parse_fee("\"$ 500\""), 500.0);
        assert_eq!(parse_fee("abc"), 0.0);
        assert_eq!(parse_fee(""), 0.0);
        assert_eq!(parse_fee("-20"), 0.0);
    }

    #[test]
    fn test_record_deserialization_with_lenient_fees() {
        let json = r#"{
            "code": "PC.05.07",
            "description": "Osteosíntesis de fémur proximal",
            "region": "PC",
            "fees": {"surgeon": "$120,000", "assistant": null, "total": 150000}
        }"#;

        let record: ProcedureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.region, Region::PelvisHip);
        assert_eq!(record.fees.surgeon, 120_000.0);
        assert_eq!(record.fees.assistant, 0.0);
        assert_eq!(record.fees.total, 150_000.0);
        assert!(record.complexity.is_none());
    }

    #[test]
    fn test_record_without_fees_defaults_to_zero() {
        let json = r#"{"code": "RO.01.01", "description": "Artroscopia", "region": "RO"}"#;
        let record: ProcedureRecord = serde_json::from_str(json).unwrap();
        assert!(record.fees.is_empty());
    }

    #[test]
    fn test_classification_unknown() {
        let result = ClassificationResult::unknown();
        assert!(result.is_unknown());
        assert_eq!(result.confidence, 0.0);
        assert!(result.rationale.is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Suggestion::new("MS.01.01", "", 1.7).confidence, 1.0);
        assert_eq!(Suggestion::new("MS.01.01", "", -0.2).confidence, 0.0);
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
        let c = ClassificationResult::new(Region::Spine, 2.0, "columna lumbar");
        assert_eq!(c.confidence, 1.0);
    }
}
