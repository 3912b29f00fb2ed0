//! Types used by the job queue database.

/// Job identifier.
pub type JobId = i64;

/// High-level job state stored as a string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Paused,
    Completed,
    Error,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Paused => "paused",
            JobState::Completed => "completed",
            JobState::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "queued" => JobState::Queued,
            "running" => JobState::Running,
            "paused" => JobState::Paused,
            "completed" => JobState::Completed,
            "error" => JobState::Error,
            _ => JobState::Error,
        }
    }
}

/// Minimal per-job settings container, stored as JSON in the DB.
///
/// This keeps the schema flexible while still allowing structured config
/// per job (segment limits, bandwidth caps, etc.) as we extend the core.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
pub struct JobSettings {
    /// Reserved for future per-job tuning (e.g., segment bounds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Directory the resolved output file is written under, captured at
    /// `ddm add` time so `ddm run` resolves the same location regardless
    /// of its own current working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
}

/// Summary view used by the CLI `status` command.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub id: JobId,
    pub source: String,
    pub state: JobState,
    pub output_path: Option<String>,
    pub total_size: Option<i64>,
    pub completed_bytes: i64,
}

/// Full job record used by the CLI's run loop.
#[derive(Debug, Clone)]
pub struct JobDetails {
    pub id: JobId,
    pub source: String,
    pub output_path: Option<String>,
    pub total_size: Option<i64>,
    pub completed_bytes: i64,
    pub state: JobState,
    pub created_at: i64,
    pub updated_at: i64,
    pub settings: JobSettings,
}

/// Metadata fields updated once the Source Resolver has produced a
/// `FileSpec` for this job (output path, expected size) and as the Segment
/// Manager reports progress (`completed_bytes`).
#[derive(Debug, Clone)]
pub struct JobMetadata {
    pub output_path: Option<String>,
    pub total_size: Option<i64>,
    pub completed_bytes: i64,
}
