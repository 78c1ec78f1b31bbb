//! Device capability seams: permissions, camera/gallery, GPS.

use async_trait::async_trait;
use trafficeye_core::draft::MediaKind;
use trafficeye_core::location::Coordinates;
use trafficeye_core::types::MediaUri;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Camera,
    MediaLibrary,
    /// Foreground location.
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Result of one camera or picker session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Selected(MediaUri),
    /// The user dismissed the camera or picker.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device I/O failed: {0}")]
    Io(String),

    #[error("Device unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request(&self, permission: Permission) -> PermissionStatus;
}

#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn launch_camera(&self, kind: MediaKind) -> Result<PickOutcome, DeviceError>;
    async fn launch_library(&self, kind: MediaKind) -> Result<PickOutcome, DeviceError>;
}

#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// One high-accuracy position fix.
    async fn current_position(&self) -> Result<Coordinates, DeviceError>;
}
