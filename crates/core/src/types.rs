/// All entity primary keys are UUIDs; segment ids are client-supplied,
/// dream ids may be client-supplied or generated server-side (v4).
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
