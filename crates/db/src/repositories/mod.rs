//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod dream_repo;
pub mod segment_repo;

pub use dream_repo::DreamRepo;
pub use segment_repo::SegmentRepo;

/// Outcome of an idempotent create.
///
/// Callers never distinguish a lost insert race from a normal replay:
/// both come back as `AlreadyExists` with the row that won.
#[derive(Debug, Clone)]
pub enum CreateOutcome<T> {
    Created(T),
    AlreadyExists(T),
}

impl<T> CreateOutcome<T> {
    /// The row, regardless of which caller created it.
    pub fn into_inner(self) -> T {
        match self {
            CreateOutcome::Created(row) | CreateOutcome::AlreadyExists(row) => row,
        }
    }

    pub fn already_existed(&self) -> bool {
        matches!(self, CreateOutcome::AlreadyExists(_))
    }
}

/// Whether a sqlx error is a PostgreSQL unique-constraint violation
/// (error code 23505). This is the one failure the idempotent write
/// protocol recovers from locally.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
