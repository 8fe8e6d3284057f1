//! SQLite Audiobook Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{AudiobookRecord, AudiobookRepositoryPort, RepositoryError};

/// SQLite Audiobook Repository
pub struct SqliteAudiobookRepository {
    pool: DbPool,
}

impl SqliteAudiobookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AudiobookRow {
    id: String,
    original_name: String,
    stored_filename: String,
    content_type: String,
    style_prompt: String,
    duration_secs: Option<i64>,
    created_at: String,
}

impl TryFrom<AudiobookRow> for AudiobookRecord {
    type Error = RepositoryError;

    fn try_from(row: AudiobookRow) -> Result<Self, Self::Error> {
        Ok(AudiobookRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            original_name: row.original_name,
            stored_filename: row.stored_filename,
            content_type: row.content_type,
            style_prompt: row.style_prompt,
            duration_secs: row.duration_secs.map(|d| d as u64),
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, original_name, stored_filename, content_type, style_prompt, duration_secs, created_at";

#[async_trait]
impl AudiobookRepositoryPort for SqliteAudiobookRepository {
    async fn save(&self, audiobook: &AudiobookRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO audiobooks (id, original_name, stored_filename, content_type, style_prompt, duration_secs, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                original_name = excluded.original_name,
                stored_filename = excluded.stored_filename,
                content_type = excluded.content_type,
                style_prompt = excluded.style_prompt,
                duration_secs = excluded.duration_secs
            "#,
        )
        .bind(audiobook.id.to_string())
        .bind(&audiobook.original_name)
        .bind(&audiobook.stored_filename)
        .bind(&audiobook.content_type)
        .bind(&audiobook.style_prompt)
        .bind(audiobook.duration_secs.map(|d| d as i64))
        .bind(audiobook.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AudiobookRecord>, RepositoryError> {
        let row: Option<AudiobookRow> = sqlx::query_as(&format!(
            "SELECT {} FROM audiobooks WHERE id = ?",
            SELECT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(AudiobookRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<AudiobookRecord>, RepositoryError> {
        let rows: Vec<AudiobookRow> = sqlx::query_as(&format!(
            "SELECT {} FROM audiobooks ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(AudiobookRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        // 使用事务确保记录与图片记录一并删除
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM generated_images WHERE audiobook_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM audiobooks WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
