//! The ambient job queue (SQLite via sqlx).
//!
//! One row per submitted source (a job): the original input string, the
//! output path, lifecycle state, and a `completed_bytes` tally mirroring
//! the on-disk Resume Store (see [`crate::resume`]) so `ddm status` can list
//! progress without opening every sidecar file. This is the persistence unit
//! above a single [`crate::resolver::FileSpec`]'s download lifecycle; the
//! Resume Store remains the authoritative per-file piece record.

pub mod db;
pub mod types;

pub use db::ResumeDb;
pub use types::*;
