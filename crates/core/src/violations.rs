//! Violation catalogue, report statuses, and points awarded.

pub const VIOLATION_SPEEDING: &str = "Speeding";
pub const VIOLATION_RED_LIGHT: &str = "Red Light";
pub const VIOLATION_NO_HELMET: &str = "No Helmet";
/// Label used when the vision model could not classify the image.
pub const VIOLATION_OTHER: &str = "Other";

/// All violation labels the reporting flow offers.
pub const VIOLATION_TYPES: &[&str] = &[
    VIOLATION_SPEEDING,
    VIOLATION_RED_LIGHT,
    "Wrong Parking",
    VIOLATION_NO_HELMET,
    "Wrong Side",
    "Lane Cutting",
    "Drunk Driving",
    "Dangerous Driving",
    "No Seat Belt",
    "No License",
    "Overloading",
];

/// Labels offered as one-tap chips on the verification screen.
pub const QUICK_SELECT_VIOLATIONS: &[&str] =
    &[VIOLATION_SPEEDING, VIOLATION_RED_LIGHT, VIOLATION_NO_HELMET];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_UNDER_REVIEW: &str = "under_review";
pub const STATUS_VERIFIED: &str = "verified";
pub const STATUS_REJECTED: &str = "rejected";

pub const REPORT_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_UNDER_REVIEW,
    STATUS_VERIFIED,
    STATUS_REJECTED,
];

/// Points credited to a citizen for each submitted report.
pub const POINTS_REPORT_SUBMISSION: i64 = 10;

/// Points credited to the referrer when a referred citizen signs up.
pub const POINTS_REFERRAL_BONUS: i64 = 50;
