//! The citizen report pipeline.
//!
//! capture -> locate -> analyze -> verify -> submit, orchestrated by
//! [`ReportFlow`] over injected device, vision and sink collaborators.

pub mod device;
pub mod geocoder;
pub mod location;
pub mod media;
pub mod notices;
pub mod report;
pub mod sink;

pub use device::{
    DeviceError, MediaSource, Permission, PermissionProvider, PermissionStatus, PickOutcome,
    PositionProvider,
};
pub use geocoder::{GeocodeError, Geocoder, GeocoderConfig, NominatimGeocoder};
pub use location::{LocationConfig, LocationResolver};
pub use media::{MediaAcquisition, MediaOrigin};
pub use notices::ChannelNotices;
pub use report::ReportFlow;
pub use sink::{MemoryReportSink, ReportSink, SinkError, SubmissionReceipt};
