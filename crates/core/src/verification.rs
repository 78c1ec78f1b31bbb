//! Human-in-the-loop verification of extraction results.
//!
//! [`VerificationGate`] starts in [`GateState::Editing`]. `submit()` either
//! rejects (the gate stays in `Editing` and records a field notice) or
//! accepts, moving to [`GateState::Accepted`] and emitting a
//! [`VerifiedReport`]. Confidence is display-only and never blocks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draft::{Media, ReportDraft};
use crate::error::CoreError;
use crate::extraction::{ConfidenceBand, ExtractionResult};
use crate::location::Coordinates;
use crate::types::Timestamp;
use crate::violations::QUICK_SELECT_VIOLATIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Editing,
    Accepted,
}

/// The finalized, user-approved record handed to submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedReport {
    pub draft_id: Uuid,
    pub plate_number: String,
    pub violation_type: String,
    pub confidence: u8,
    /// Diagnostic from a degraded extraction, kept for officer review.
    pub extraction_error: Option<String>,
    pub media: Media,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub captured_at: Timestamp,
    pub verified_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct VerificationGate {
    draft: ReportDraft,
    extraction: ExtractionResult,
    plate_number: String,
    violation_type: String,
    state: GateState,
    notice: Option<CoreError>,
}

impl VerificationGate {
    /// Open the gate for `draft`, pre-filling the editable fields.
    pub fn new(draft: ReportDraft, extraction: ExtractionResult) -> Self {
        Self {
            plate_number: extraction.plate_number.clone(),
            violation_type: extraction.violation_type.clone(),
            draft,
            extraction,
            state: GateState::Editing,
            notice: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn plate_number(&self) -> &str {
        &self.plate_number
    }

    pub fn violation_type(&self) -> &str {
        &self.violation_type
    }

    pub fn confidence(&self) -> u8 {
        self.extraction.confidence
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        self.extraction.confidence_band()
    }

    /// The extraction this gate was opened with.
    pub fn extraction(&self) -> &ExtractionResult {
        &self.extraction
    }

    /// Notice from the most recent rejected `submit()`, if any.
    pub fn notice(&self) -> Option<&CoreError> {
        self.notice.as_ref()
    }

    pub fn set_plate_number(&mut self, value: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_editing()?;
        self.plate_number = value.into();
        Ok(())
    }

    pub fn set_violation_type(&mut self, value: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_editing()?;
        self.violation_type = value.into();
        Ok(())
    }

    /// Overwrite the violation type with one of the quick-select labels.
    pub fn quick_select(&mut self, label: &str) -> Result<(), CoreError> {
        let known = QUICK_SELECT_VIOLATIONS
            .iter()
            .find(|l| **l == label)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid quick-select label '{label}'. Must be one of: {QUICK_SELECT_VIOLATIONS:?}"
                ))
            })?;
        self.set_violation_type(*known)
    }

    /// Validate the edited fields and, if they pass, emit the report.
    pub fn submit(&mut self) -> Result<VerifiedReport, CoreError> {
        self.ensure_editing()?;

        if let Err(rejection) = self.validate() {
            self.notice = Some(rejection.clone());
            return Err(rejection);
        }

        self.notice = None;
        self.state = GateState::Accepted;

        Ok(VerifiedReport {
            draft_id: self.draft.id,
            plate_number: self.plate_number.trim().to_string(),
            violation_type: self.violation_type.trim().to_string(),
            confidence: self.extraction.confidence,
            extraction_error: self.extraction.error.clone(),
            media: self.draft.media.clone(),
            address: self.draft.address.clone(),
            coordinates: self.draft.coordinates,
            description: self.draft.description.clone(),
            captured_at: self.draft.captured_at,
            verified_at: chrono::Utc::now(),
        })
    }

    /// Take up address, location and description edits made to the draft
    /// while the gate was open.
    ///
    /// The extraction only describes the media it was run on, so a draft
    /// whose media changed since the gate opened must be analysed again.
    pub fn sync_draft(&mut self, current: &ReportDraft) -> Result<(), CoreError> {
        self.ensure_editing()?;
        if current.id != self.draft.id {
            return Err(CoreError::Conflict(
                "verification belongs to a different report draft".to_string(),
            ));
        }
        if current.media != self.draft.media {
            return Err(CoreError::Conflict(
                "Media changed since analysis. Please analyze again.".to_string(),
            ));
        }
        self.draft = current.clone();
        Ok(())
    }

    /// Return an accepted gate to editing after a failed hand-off, so the
    /// user can retry without re-entering anything.
    pub fn reopen(&mut self) {
        self.state = GateState::Editing;
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.plate_number.trim().is_empty() {
            return Err(CoreError::MissingField {
                field: "plate_number",
                message: "Please enter a vehicle number",
            });
        }
        if self.violation_type.trim().is_empty() {
            return Err(CoreError::MissingField {
                field: "violation_type",
                message: "Please select or enter a violation type",
            });
        }
        Ok(())
    }

    fn ensure_editing(&self) -> Result<(), CoreError> {
        match self.state {
            GateState::Editing => Ok(()),
            GateState::Accepted => Err(CoreError::Conflict(
                "report has already been verified".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn draft_with_image() -> ReportDraft {
        let mut draft = ReportDraft::new();
        draft.set_media(Media::Image("file:///shot.jpg".into()));
        draft.set_address("MG Road, Pune");
        draft.set_description("jumped the signal");
        draft
    }

    fn gate(plate: &str, violation: &str, confidence: u8) -> VerificationGate {
        VerificationGate::new(draft_with_image(), ExtractionResult::new(plate, violation, confidence))
    }

    #[test]
    fn fields_prefilled_from_extraction() {
        let g = gate("MH12AB1234", "Speeding", 92);
        assert_eq!(g.plate_number(), "MH12AB1234");
        assert_eq!(g.violation_type(), "Speeding");
        assert_eq!(g.confidence(), 92);
        assert_eq!(g.state(), GateState::Editing);
    }

    #[test]
    fn blank_plate_rejected_and_stays_editing() {
        let mut g = gate("   ", "Speeding", 92);
        assert_matches!(
            g.submit(),
            Err(CoreError::MissingField { field: "plate_number", .. })
        );
        assert_eq!(g.state(), GateState::Editing);
        assert_eq!(
            g.notice().map(ToString::to_string).as_deref(),
            Some("Please enter a vehicle number")
        );
    }

    #[test]
    fn blank_violation_rejected() {
        let mut g = gate("MH12AB1234", "\t", 92);
        assert_matches!(
            g.submit(),
            Err(CoreError::MissingField { field: "violation_type", .. })
        );
        assert_eq!(g.state(), GateState::Editing);
    }

    #[test]
    fn low_confidence_does_not_block() {
        let mut g = gate("MH12AB1234", "Speeding", 0);
        let report = g.submit().unwrap();
        assert_eq!(report.confidence, 0);
        assert_eq!(g.state(), GateState::Accepted);
    }

    #[test]
    fn correction_after_rejection_is_accepted() {
        let mut g = gate("", "Speeding", 70);
        assert!(g.submit().is_err());
        g.set_plate_number("KA01XY0001").unwrap();
        let report = g.submit().unwrap();
        assert_eq!(report.plate_number, "KA01XY0001");
        assert!(g.notice().is_none());
    }

    #[test]
    fn report_merges_draft_fields() {
        let mut g = gate(" MH12AB1234 ", "Red Light", 88);
        let draft = g.draft().clone();
        let report = g.submit().unwrap();
        assert_eq!(report.draft_id, draft.id);
        assert_eq!(report.plate_number, "MH12AB1234");
        assert_eq!(report.media, Media::Image("file:///shot.jpg".into()));
        assert_eq!(report.address, "MG Road, Pune");
        assert_eq!(report.description.as_deref(), Some("jumped the signal"));
        assert_eq!(report.captured_at, draft.captured_at);
    }

    #[test]
    fn degraded_extraction_error_is_carried() {
        let mut g = VerificationGate::new(draft_with_image(), ExtractionResult::fallback("no json"));
        g.set_plate_number("MH01AA0001").unwrap();
        let report = g.submit().unwrap();
        assert_eq!(report.violation_type, "Other");
        assert_eq!(report.extraction_error.as_deref(), Some("no json"));
    }

    #[test]
    fn quick_select_overwrites_violation() {
        let mut g = gate("MH12AB1234", "Other", 60);
        g.quick_select("No Helmet").unwrap();
        assert_eq!(g.violation_type(), "No Helmet");
    }

    #[test]
    fn quick_select_rejects_unknown_label() {
        let mut g = gate("MH12AB1234", "Other", 60);
        assert_matches!(g.quick_select("Overloading"), Err(CoreError::Validation(_)));
        assert_eq!(g.violation_type(), "Other");
    }

    #[test]
    fn accepted_gate_is_frozen() {
        let mut g = gate("MH12AB1234", "Speeding", 90);
        g.submit().unwrap();
        assert_matches!(g.set_plate_number("X"), Err(CoreError::Conflict(_)));
        assert_matches!(g.submit(), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn synced_draft_edits_reach_report() {
        let mut g = gate("MH12AB1234", "Speeding", 90);
        let mut current = g.draft().clone();
        current.set_address("FC Road, Pune");
        current.set_description("second signal");

        g.sync_draft(&current).unwrap();
        let report = g.submit().unwrap();

        assert_eq!(report.address, "FC Road, Pune");
        assert_eq!(report.description.as_deref(), Some("second signal"));
    }

    #[test]
    fn sync_rejects_changed_media() {
        let mut g = gate("MH12AB1234", "Speeding", 90);
        let mut current = g.draft().clone();
        current.set_media(Media::Video("file:///clip.mp4".into()));
        current.set_address("FC Road, Pune");

        assert_matches!(g.sync_draft(&current), Err(CoreError::Conflict(_)));
        assert_eq!(g.draft().address, "MG Road, Pune");
        assert_eq!(g.state(), GateState::Editing);
    }

    #[test]
    fn sync_rejects_other_draft() {
        let mut g = gate("MH12AB1234", "Speeding", 90);
        assert_matches!(g.sync_draft(&draft_with_image()), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn reopened_gate_can_resubmit() {
        let mut g = gate("MH12AB1234", "Speeding", 90);
        g.submit().unwrap();
        g.reopen();
        assert_eq!(g.state(), GateState::Editing);
        g.set_plate_number("MH12AB9999").unwrap();
        assert_eq!(g.submit().unwrap().plate_number, "MH12AB9999");
    }
}
