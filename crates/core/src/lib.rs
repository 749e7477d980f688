//! Pure domain logic shared across the Campfire workspace.
//!
//! No I/O lives here: error taxonomy, shared type aliases, transcript
//! assembly, video-generation metadata records, and input validation.

pub mod error;
pub mod transcript;
pub mod types;
pub mod validate;
pub mod video;
