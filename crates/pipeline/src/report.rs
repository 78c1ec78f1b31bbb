//! The report-creation flow.
//!
//! [`ReportFlow`] owns the single active [`ReportDraft`]. Every async
//! stage remembers the id of the draft it started on and writes its
//! result back only if that draft is still the active one, so a capture
//! or analysis that completes after the user discarded the draft is
//! dropped instead of landing on a newer draft.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::FutureExt;
use trafficeye_core::draft::{Media, MediaKind, ReportDraft};
use trafficeye_core::error::CoreError;
use trafficeye_core::location::ResolvedLocation;
use trafficeye_core::notice::{Notice, NoticeSink};
use trafficeye_core::verification::VerificationGate;
use trafficeye_vision::ViolationAnalyzer;
use uuid::Uuid;

use crate::location::LocationResolver;
use crate::media::{MediaAcquisition, MediaOrigin};
use crate::sink::{ReportSink, SubmissionReceipt};

pub struct ReportFlow {
    active: Mutex<Option<ReportDraft>>,
    media: MediaAcquisition,
    location: LocationResolver,
    analyzer: Arc<dyn ViolationAnalyzer>,
    sink: Arc<dyn ReportSink>,
    notices: Arc<dyn NoticeSink>,
}

impl ReportFlow {
    pub fn new(
        media: MediaAcquisition,
        location: LocationResolver,
        analyzer: Arc<dyn ViolationAnalyzer>,
        sink: Arc<dyn ReportSink>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            active: Mutex::new(None),
            media,
            location,
            analyzer,
            sink,
            notices,
        }
    }

    // -----------------------------------------------------------------------
    // Draft lifecycle
    // -----------------------------------------------------------------------

    /// Start a fresh draft, replacing any current one.
    pub fn start_draft(&self) -> Uuid {
        let draft = ReportDraft::new();
        let id = draft.id;
        if let Some(previous) = self.lock().replace(draft) {
            tracing::debug!(draft_id = %previous.id, "Replaced unfinished draft");
        }
        id
    }

    /// Drop the current draft. In-flight stages for it become stale.
    pub fn discard(&self) -> bool {
        let discarded = self.lock().take();
        if let Some(draft) = &discarded {
            tracing::debug!(draft_id = %draft.id, "Draft discarded");
        }
        discarded.is_some()
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.lock().as_ref().map(|d| d.id)
    }

    pub fn snapshot(&self) -> Option<ReportDraft> {
        self.lock().clone()
    }

    // -----------------------------------------------------------------------
    // Capture and location
    // -----------------------------------------------------------------------

    pub async fn capture_image(&self) -> Option<Media> {
        self.acquire(MediaOrigin::Camera, MediaKind::Image).await
    }

    pub async fn pick_image(&self) -> Option<Media> {
        self.acquire(MediaOrigin::Library, MediaKind::Image).await
    }

    pub async fn capture_video(&self) -> Option<Media> {
        self.acquire(MediaOrigin::Camera, MediaKind::Video).await
    }

    pub async fn pick_video(&self) -> Option<Media> {
        self.acquire(MediaOrigin::Library, MediaKind::Video).await
    }

    /// Acquire media onto the active draft. With no active draft, one is
    /// started once media actually arrives.
    ///
    /// Callers serialize acquisitions; this does not guard against two
    /// overlapping calls on the same draft.
    async fn acquire(&self, origin: MediaOrigin, kind: MediaKind) -> Option<Media> {
        let draft_id = self.active_id();
        let media = self.media.acquire(origin, kind).await?;

        let applied = self.write_back(draft_id, |draft| draft.set_media(media.clone()));
        if applied.is_none() {
            tracing::debug!(?draft_id, "Discarding media for inactive draft");
            return None;
        }
        Some(media)
    }

    pub fn clear_media(&self) -> Result<(), CoreError> {
        self.update_active(ReportDraft::clear_media)
    }

    /// Resolve the device location onto the active draft's address.
    pub async fn detect_location(&self) -> Option<ResolvedLocation> {
        let draft_id = self.active_id();
        let location = self.location.resolve().await?;

        self.write_back(draft_id, |draft| draft.apply_location(&location))?;
        self.notices
            .notify(Notice::success("Location detected successfully!"));
        Some(location)
    }

    pub fn set_address(&self, address: &str) -> Result<(), CoreError> {
        self.update_active(|draft| draft.set_address(address))
    }

    pub fn set_description(&self, text: &str) -> Result<(), CoreError> {
        self.update_active(|draft| draft.set_description(text))
    }

    // -----------------------------------------------------------------------
    // Analyze and submit
    // -----------------------------------------------------------------------

    /// Run AI extraction for the active draft and open its verification
    /// gate.
    ///
    /// Returns `Ok(None)` when the draft was discarded while the analysis
    /// ran. A draft without media is rejected with a notice.
    pub async fn analyze(&self) -> Result<Option<VerificationGate>, CoreError> {
        let draft = self.snapshot().ok_or_else(no_active_draft)?;
        if let Err(e) = draft.ensure_submittable() {
            self.notices.notify(Notice::error(e.to_string()));
            return Err(e);
        }

        let extraction = self.analyzer.analyze_draft(&draft).await;

        if self.active_id() != Some(draft.id) {
            tracing::debug!(draft_id = %draft.id, "Discarding extraction for inactive draft");
            return Ok(None);
        }
        tracing::info!(
            draft_id = %draft.id,
            confidence = extraction.confidence,
            degraded = extraction.is_degraded(),
            "Extraction ready for verification"
        );
        Ok(Some(VerificationGate::new(draft, extraction)))
    }

    /// Validate the gate and hand the verified report to the sink.
    ///
    /// The gate first takes up draft edits made since analysis. On success
    /// the draft is destroyed. A sink failure or panic leaves the draft in
    /// place and reopens the gate for another attempt.
    pub async fn submit(&self, gate: &mut VerificationGate) -> Result<SubmissionReceipt, CoreError> {
        let draft_id = gate.draft().id;
        let prepared = match self.lock().as_ref() {
            Some(current) if current.id == draft_id => {
                gate.sync_draft(current).and_then(|()| gate.submit())
            }
            _ => {
                tracing::warn!(%draft_id, "Submission for inactive draft ignored");
                return Err(CoreError::Conflict(
                    "report draft is no longer active".to_string(),
                ));
            }
        };

        let report = match prepared {
            Ok(report) => report,
            Err(e) => {
                self.notices.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        match AssertUnwindSafe(self.sink.submit(&report))
            .catch_unwind()
            .await
        {
            Ok(Ok(receipt)) => {
                self.finish(draft_id);
                tracing::info!(
                    %draft_id,
                    report_id = %receipt.report_id,
                    points = receipt.points_awarded,
                    "Report submitted"
                );
                self.notices.notify(Notice::success(format!(
                    "Report submitted successfully! You earned {} points.",
                    receipt.points_awarded
                )));
                Ok(receipt)
            }
            Ok(Err(e)) => {
                gate.reopen();
                tracing::error!(%draft_id, error = %e, "Report submission failed");
                self.notices.notify(Notice::error(e.to_string()));
                Err(CoreError::Provider(e.to_string()))
            }
            Err(_) => {
                gate.reopen();
                tracing::error!(%draft_id, "Report submission aborted unexpectedly");
                self.notices.notify(Notice::unexpected());
                Err(CoreError::Internal("report submission aborted".to_string()))
            }
        }
    }

    // ---- private helpers ----

    fn lock(&self) -> MutexGuard<'_, Option<ReportDraft>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply a stage result to the draft it started on.
    ///
    /// `id` is the draft that was active when the stage began. If that
    /// draft is gone the result is dropped. A stage that began with no
    /// draft starts one here, unless another draft appeared meanwhile.
    fn write_back<R>(&self, id: Option<Uuid>, f: impl FnOnce(&mut ReportDraft) -> R) -> Option<R> {
        let mut active = self.lock();
        match id {
            Some(id) => match active.as_mut() {
                Some(draft) if draft.id == id => Some(f(draft)),
                _ => None,
            },
            None if active.is_none() => {
                let draft = active.insert(ReportDraft::new());
                tracing::debug!(draft_id = %draft.id, "Started draft for acquired data");
                Some(f(draft))
            }
            None => None,
        }
    }

    fn update_active<R>(&self, f: impl FnOnce(&mut ReportDraft) -> R) -> Result<R, CoreError> {
        self.lock().as_mut().map(f).ok_or_else(no_active_draft)
    }

    fn finish(&self, id: Uuid) {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|d| d.id == id) {
            *active = None;
        }
    }
}

fn no_active_draft() -> CoreError {
    CoreError::NotFound {
        entity: "report draft",
        id: "active".to_string(),
    }
}
