//! Results of the AI extraction step.
//!
//! An [`ExtractionResult`] is always usable: when the vision service fails
//! the extractor substitutes [`ExtractionResult::fallback`], which asks the
//! user for manual entry.

use serde::{Deserialize, Serialize};

use crate::violations::VIOLATION_OTHER;

/// Plate text telling the user to type the plate themselves.
pub const MANUAL_ENTRY_PLATE: &str = "Manual entry required";

/// Plate text the model is instructed to return when no plate is visible.
pub const UNDETECTED_PLATE: &str = "Not detected";

/// Confidence attached to every degraded result.
pub const FALLBACK_CONFIDENCE: u8 = 60;

/// Plate text used when there is no image to analyse (video drafts).
pub const NOT_APPLICABLE_PLATE: &str = "N/A";

/// Violation label used when there is no image to analyse.
pub const UNKNOWN_VIOLATION: &str = "Unknown";

pub const HIGH_CONFIDENCE_MIN: u8 = 80;
pub const MEDIUM_CONFIDENCE_MIN: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(rename = "vehicleNumber")]
    pub plate_number: String,
    pub violation_type: String,
    /// Model certainty in `[0, 100]`.
    pub confidence: u8,
    /// Diagnostic attached when the result is degraded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn new(
        plate_number: impl Into<String>,
        violation_type: impl Into<String>,
        confidence: u8,
    ) -> Self {
        Self {
            plate_number: plate_number.into(),
            violation_type: violation_type.into(),
            confidence: confidence.min(100),
            error: None,
        }
    }

    /// The degraded result returned on any extraction failure.
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            plate_number: MANUAL_ENTRY_PLATE.to_string(),
            violation_type: VIOLATION_OTHER.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            error: Some(error.into()),
        }
    }

    /// Result used when the draft carries no image.
    pub fn not_applicable() -> Self {
        Self::new(NOT_APPLICABLE_PLATE, UNKNOWN_VIOLATION, 0)
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the plate field holds real plate text rather than a sentinel.
    pub fn plate_detected(&self) -> bool {
        let plate = self.plate_number.trim();
        !(plate.is_empty()
            || plate.eq_ignore_ascii_case(MANUAL_ENTRY_PLATE)
            || plate.eq_ignore_ascii_case(UNDETECTED_PLATE)
            || plate.eq_ignore_ascii_case(NOT_APPLICABLE_PLATE))
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.confidence)
    }
}

/// Coarse confidence bucket used when displaying the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_CONFIDENCE_MIN {
            ConfidenceBand::High
        } else if score >= MEDIUM_CONFIDENCE_MIN {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Clamp a model-reported score into `[0, 100]`, rounding fractions.
///
/// Non-finite values are rejected.
pub fn normalize_confidence(raw: f64) -> Option<u8> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}
