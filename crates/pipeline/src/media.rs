//! Media Acquisition: camera and gallery capture for photo or video.
//!
//! Every operation asks for its permission first. Denial produces one
//! permission notice, cancellation is silent, and device failures produce
//! one error notice. In all three cases the result is `None`.

use std::sync::Arc;

use trafficeye_core::draft::{Media, MediaKind};
use trafficeye_core::notice::{Notice, NoticeSink};

use crate::device::{MediaSource, Permission, PermissionProvider, PickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaOrigin {
    Camera,
    Library,
}

impl MediaOrigin {
    fn permission(self) -> Permission {
        match self {
            MediaOrigin::Camera => Permission::Camera,
            MediaOrigin::Library => Permission::MediaLibrary,
        }
    }
}

pub struct MediaAcquisition {
    permissions: Arc<dyn PermissionProvider>,
    source: Arc<dyn MediaSource>,
    notices: Arc<dyn NoticeSink>,
}

impl MediaAcquisition {
    pub fn new(
        permissions: Arc<dyn PermissionProvider>,
        source: Arc<dyn MediaSource>,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            permissions,
            source,
            notices,
        }
    }

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

    pub async fn acquire(&self, origin: MediaOrigin, kind: MediaKind) -> Option<Media> {
        let status = self.permissions.request(origin.permission()).await;
        if !status.is_granted() {
            tracing::info!(?origin, ?kind, "Media permission denied");
            self.notices
                .notify(Notice::permission_required(denied_message(origin, kind)));
            return None;
        }

        let outcome = match origin {
            MediaOrigin::Camera => self.source.launch_camera(kind).await,
            MediaOrigin::Library => self.source.launch_library(kind).await,
        };

        match outcome {
            Ok(PickOutcome::Selected(uri)) => {
                tracing::debug!(?origin, ?kind, %uri, "Media acquired");
                Some(Media::new(kind, uri))
            }
            Ok(PickOutcome::Cancelled) => None,
            Err(e) => {
                tracing::error!(?origin, ?kind, error = %e, "Media acquisition failed");
                self.notices.notify(Notice::error(failure_message(origin, kind)));
                None
            }
        }
    }
}

fn denied_message(origin: MediaOrigin, kind: MediaKind) -> &'static str {
    match (origin, kind) {
        (MediaOrigin::Camera, MediaKind::Image) => "Please grant camera access to capture photos.",
        (MediaOrigin::Camera, MediaKind::Video) => "Please grant camera access to record videos.",
        (MediaOrigin::Library, MediaKind::Image) => {
            "Please grant photo library access to select images."
        }
        (MediaOrigin::Library, MediaKind::Video) => {
            "Please grant photo library access to select videos."
        }
    }
}

fn failure_message(origin: MediaOrigin, kind: MediaKind) -> &'static str {
    match (origin, kind) {
        (MediaOrigin::Camera, MediaKind::Image) => "Failed to capture photo.",
        (MediaOrigin::Camera, MediaKind::Video) => "Failed to record video.",
        (MediaOrigin::Library, MediaKind::Image) => "Failed to pick image from gallery.",
        (MediaOrigin::Library, MediaKind::Video) => "Failed to pick video from gallery.",
    }
}
