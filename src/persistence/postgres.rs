//! PostgreSQL implementation of the record store.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::RecordStore;
use crate::config::AutopilotConfig;
use crate::domain::{
    ActivityCategory, ActivityEntry, CommitId, CommitRecord, DB_SNAPSHOT_KEY, NewCommitRecord,
    RecordId,
};
use crate::error::AutopilotError;

type RecordRow = (Uuid, String, String, String, i64, Vec<String>, DateTime<Utc>);

const RECORD_COLUMNS: &str =
    "id, title, branch, commit_hash, files_changed, committed_files, created_at";

/// PostgreSQL-backed record store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Creates a record store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the pool settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] if no connection can be
    /// established.
    pub async fn connect(config: &AutopilotConfig) -> Result<Self, AutopilotError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AutopilotError::Persistence`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), AutopilotError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AutopilotError::Persistence(e.to_string()))
    }

    /// Joins record rows with their metadata rows.
    async fn hydrate(&self, rows: Vec<RecordRow>) -> Result<Vec<CommitRecord>, AutopilotError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.0).collect();
        let meta_rows = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT record_id, key, value FROM record_metadata WHERE record_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut metadata: HashMap<Uuid, BTreeMap<String, String>> = HashMap::new();
        for (record_id, key, value) in meta_rows {
            metadata.entry(record_id).or_default().insert(key, value);
        }

        Ok(rows
            .into_iter()
            .map(
                |(id, title, branch, commit_hash, files_changed, committed_files, created_at)| {
                    CommitRecord {
                        id: RecordId::from_uuid(id),
                        title,
                        branch,
                        commit_hash: CommitId::new(commit_hash),
                        files_changed: usize::try_from(files_changed).unwrap_or_default(),
                        committed_files,
                        metadata: metadata.remove(&id).unwrap_or_default(),
                        created_at,
                    }
                },
            )
            .collect())
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn create_record(&self, fields: NewCommitRecord) -> Result<RecordId, AutopilotError> {
        let id = RecordId::new();
        let files_changed = i64::try_from(fields.files_changed()).unwrap_or(i64::MAX);
        sqlx::query(
            "INSERT INTO commit_records \
             (id, title, branch, commit_hash, files_changed, committed_files) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*id.as_uuid())
        .bind(&fields.title)
        .bind(&fields.branch)
        .bind(fields.commit_hash.as_str())
        .bind(files_changed)
        .bind(&fields.committed_files)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn attach_metadata(
        &self,
        id: RecordId,
        key: &str,
        value: &str,
    ) -> Result<(), AutopilotError> {
        let result = sqlx::query(
            "INSERT INTO record_metadata (record_id, key, value) \
             SELECT id, $2, $3 FROM commit_records WHERE id = $1 \
             ON CONFLICT (record_id, key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(*id.as_uuid())
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AutopilotError::RecordNotFound(*id.as_uuid()));
        }
        Ok(())
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<CommitRecord>, AutopilotError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM commit_records WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn list_records(&self, limit: usize) -> Result<Vec<CommitRecord>, AutopilotError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM commit_records ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn list_degraded(&self) -> Result<Vec<CommitRecord>, AutopilotError> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM commit_records r \
             WHERE NOT EXISTS (SELECT 1 FROM record_metadata m \
                               WHERE m.record_id = r.id AND m.key = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(DB_SNAPSHOT_KEY)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn append_activity(&self, entry: &ActivityEntry) -> Result<(), AutopilotError> {
        sqlx::query("INSERT INTO activity_log (message, category, logged_at) VALUES ($1, $2, $3)")
            .bind(&entry.message)
            .bind(entry.category.as_str())
            .bind(entry.timestamp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AutopilotError> {
        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            "SELECT message, category, logged_at FROM activity_log \
             ORDER BY logged_at DESC, id DESC LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(message, category, timestamp)| {
                ActivityCategory::parse(&category).map(|category| ActivityEntry {
                    message,
                    category,
                    timestamp,
                })
            })
            .collect())
    }
}
