//! The AI extraction step of the report pipeline.
//!
//! [`ExtractionClient::analyze`] never fails: image read errors, service
//! errors, timeouts and unparseable replies all resolve to
//! [`ExtractionResult::fallback`] with the failure text attached.

use std::time::Duration;

use async_trait::async_trait;
use trafficeye_core::draft::{Media, ReportDraft};
use trafficeye_core::extraction::ExtractionResult;

use crate::api::VisionApiError;
use crate::image::InlineImage;
use crate::model::VisionModel;
use crate::parse::parse_reply;
use crate::prompt::EXTRACTION_PROMPT;

/// Default budget for one model round trip.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Why an extraction degraded.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionFailure {
    #[error("Failed to read image: {0}")]
    Image(#[from] std::io::Error),

    #[error(transparent)]
    Service(#[from] VisionApiError),

    #[error("Vision model timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid AI response format")]
    NoJson,

    #[error("Invalid AI response JSON: {0}")]
    Malformed(String),
}

/// Anything that can read a violation out of a draft's media.
#[async_trait]
pub trait ViolationAnalyzer: Send + Sync {
    /// Analyse the image at `image_uri`. Never fails.
    async fn analyze(&self, image_uri: &str) -> ExtractionResult;

    /// Analyse a draft. Drafts without an image (video or nothing) get
    /// the not-applicable result so the user fills the fields manually.
    async fn analyze_draft(&self, draft: &ReportDraft) -> ExtractionResult {
        match &draft.media {
            Media::Image(uri) => self.analyze(uri).await,
            Media::Video(_) | Media::None => {
                tracing::info!(draft_id = %draft.id, "No image on draft, skipping AI extraction");
                ExtractionResult::not_applicable()
            }
        }
    }
}

pub struct ExtractionClient<M> {
    model: M,
    timeout: Duration,
}

impl<M: VisionModel> ExtractionClient<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The fallible pipeline behind [`ViolationAnalyzer::analyze`].
    pub async fn try_analyze(&self, image_uri: &str) -> Result<ExtractionResult, ExtractionFailure> {
        let image = InlineImage::load(image_uri).await?;

        let reply = tokio::time::timeout(self.timeout, self.model.generate(EXTRACTION_PROMPT, &image))
            .await
            .map_err(|_| ExtractionFailure::Timeout(self.timeout))??;

        parse_reply(&reply)
    }
}

#[async_trait]
impl<M: VisionModel> ViolationAnalyzer for ExtractionClient<M> {
    async fn analyze(&self, image_uri: &str) -> ExtractionResult {
        match self.try_analyze(image_uri).await {
            Ok(result) => {
                tracing::info!(
                    confidence = result.confidence,
                    violation = %result.violation_type,
                    "AI extraction complete"
                );
                result
            }
            Err(e) => {
                tracing::warn!(error = %e, image_uri, "AI extraction failed, falling back to manual entry");
                ExtractionResult::fallback(e.to_string())
            }
        }
    }
}
