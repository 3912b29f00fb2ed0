//! SQLite-backed job database implementation.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::time::{SystemTime, UNIX_EPOCH};

use super::types::{JobDetails, JobId, JobMetadata, JobSettings, JobState, JobSummary};

/// Handle to the SQLite-backed job database.
///
/// The database file is stored under the XDG state directory:
/// `~/.local/state/ddm/jobs.db` on Debian.
#[derive(Clone)]
pub struct ResumeDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl ResumeDb {
    /// Open (or create) the default job database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("ddm")?;
        let state_dir = xdg_dirs.get_state_home();
        let db_path = state_dir.join("jobs.db");

        // Ensure parent directory exists.
        tokio::fs::create_dir_all(&state_dir).await?;

        let uri = format!("sqlite://{}", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;

        let db = ResumeDb { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // Single-table schema focused on jobs. Additional tables (host
        // policy, etc.) live in their own modules.
        //
        // - `source` is the original input string classified by the Source
        //   Resolver (a URL, `.metalink`, or `.jigdo` path).
        // - `completed_bytes` mirrors the Resume Store's progress so
        //   `ddm status` can list it without opening every sidecar file.
        // - `settings_json` holds per-job settings as JSON for flexibility.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                output_path TEXT,
                total_size INTEGER,
                completed_bytes INTEGER NOT NULL DEFAULT 0,
                state TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                settings_json TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new queued job with minimal information.
    ///
    /// Metadata such as output path and size are filled in later by
    /// [`ResumeDb::update_metadata`] once the Source Resolver runs.
    pub async fn add_job(&self, source: &str, settings: &JobSettings) -> Result<JobId> {
        let now = unix_timestamp();
        let state = JobState::Queued.as_str();
        let settings_json = serde_json::to_string(settings)?;

        let row_id = sqlx::query(
            r#"
            INSERT INTO jobs (
                source, output_path, total_size, completed_bytes,
                state, created_at, updated_at, settings_json
            ) VALUES (?1, NULL, NULL, 0,
                      ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(source)
        .bind(state)
        .bind(now)
        .bind(now)
        .bind(settings_json)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    /// List all jobs in the database, newest first.
    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, source, state, output_path, total_size, completed_bytes
            FROM jobs
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let source: String = row.get("source");
            let state_str: String = row.get("state");
            let output_path: Option<String> = row.get("output_path");
            let total_size: Option<i64> = row.get("total_size");
            let completed_bytes: i64 = row.get("completed_bytes");

            out.push(JobSummary {
                id,
                source,
                state: JobState::from_str(&state_str),
                output_path,
                total_size,
                completed_bytes,
            });
        }

        Ok(out)
    }

    /// Fetch a single job row with full metadata for the CLI run loop.
    pub async fn get_job(&self, id: JobId) -> Result<Option<JobDetails>> {
        let row = sqlx::query(
            r#"
            SELECT
                id, source, output_path, total_size, completed_bytes,
                state, created_at, updated_at, settings_json
            FROM jobs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: i64 = row.get("id");
        let source: String = row.get("source");
        let output_path: Option<String> = row.get("output_path");
        let total_size: Option<i64> = row.get("total_size");
        let completed_bytes: i64 = row.get("completed_bytes");
        let state_str: String = row.get("state");
        let created_at: i64 = row.get("created_at");
        let updated_at: i64 = row.get("updated_at");
        let settings_json: Option<String> = row.get("settings_json");

        let settings = settings_json
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| serde_json::from_str::<JobSettings>(s))
            .transpose()?
            .unwrap_or_default();

        Ok(Some(JobDetails {
            id,
            source,
            output_path,
            total_size,
            completed_bytes,
            state: JobState::from_str(&state_str),
            created_at,
            updated_at,
            settings,
        }))
    }

    /// Update metadata fields for an existing job once the Source Resolver
    /// has produced a `FileSpec` (or as download progress advances).
    pub async fn update_metadata(&self, id: JobId, meta: &JobMetadata) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE jobs
            SET output_path = ?1,
                total_size = ?2,
                completed_bytes = ?3,
                updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&meta.output_path)
        .bind(meta.total_size)
        .bind(meta.completed_bytes)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update only the completed-bytes tally (and updated_at).
    /// Used for durable progress: persisted as the download advances so a
    /// crash doesn't lose the last-known progress fraction.
    pub async fn update_progress(&self, id: JobId, completed_bytes: i64) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE jobs
            SET completed_bytes = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(completed_bytes)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Normalize any job left in `running` to `queued` (e.g. after a crash).
    /// Call before scheduling so stranded jobs are picked up again.
    /// Returns the number of jobs reset.
    pub async fn recover_running_jobs(&self) -> Result<u64> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE jobs
            SET state = 'queued',
                updated_at = ?1
            WHERE state = 'running'
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }

    /// Update the state of an existing job.
    pub async fn set_state(&self, id: JobId, state: JobState) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE jobs
            SET state = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(state.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Permanently remove a job row from the database.
    ///
    /// File cleanup is handled separately by the caller.
    pub async fn remove_job(&self, id: JobId) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM jobs
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
