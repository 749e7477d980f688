//! Background tasks.
//!
//! Each submodule provides a detached async unit of work spawned via
//! `tokio::spawn`, outliving the request that triggered it.

pub mod video_job;
