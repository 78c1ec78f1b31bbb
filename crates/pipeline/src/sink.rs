//! Hand-off of verified reports to the reports store.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trafficeye_core::verification::VerifiedReport;
use trafficeye_core::violations::{POINTS_REPORT_SUBMISSION, STATUS_PENDING};
use uuid::Uuid;

/// Acknowledgement of an accepted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub report_id: Uuid,
    pub status: String,
    pub points_awarded: i64,
}

impl SubmissionReceipt {
    /// Receipt for a freshly queued report.
    pub fn pending(report_id: Uuid) -> Self {
        Self {
            report_id,
            status: STATUS_PENDING.to_string(),
            points_awarded: POINTS_REPORT_SUBMISSION,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Report rejected: {0}")]
    Rejected(String),

    #[error("Reports store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn submit(&self, report: &VerifiedReport) -> Result<SubmissionReceipt, SinkError>;
}

/// Keeps submitted reports in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    reports: Mutex<Vec<VerifiedReport>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<VerifiedReport> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn submit(&self, report: &VerifiedReport) -> Result<SubmissionReceipt, SinkError> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report.clone());
        Ok(SubmissionReceipt::pending(Uuid::new_v4()))
    }
}
