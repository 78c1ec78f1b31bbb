/// Identity-provider user ids are UUID strings.
pub type UserId = String;

/// Local or remote reference to a captured photo or video.
pub type MediaUri = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
