//! Resume Store: the authoritative on-disk record of which pieces of a
//! single file have been completed, surviving process restarts.
//!
//! Distinct from [`crate::job_queue`]'s SQLite-backed `completed_bitmap`
//! cache: that table lets `ddm status` list progress across many jobs
//! without touching disk for each one, but this sidecar file is the source
//! of truth a [`crate::segment_manager`] resumes from.

mod record;

pub use record::{resume_path_for, ResumeRecord};
