//! SQLite Generated Image Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    GeneratedImageRecord, GeneratedImageRepositoryPort, RepositoryError,
};

/// SQLite Generated Image Repository
pub struct SqliteGeneratedImageRepository {
    pool: DbPool,
}

impl SqliteGeneratedImageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct GeneratedImageRow {
    id: String,
    audiobook_id: String,
    timestamp_secs: i64,
    transcription: String,
    image_prompt: String,
    image_filename: String,
    created_at: String,
}

impl TryFrom<GeneratedImageRow> for GeneratedImageRecord {
    type Error = RepositoryError;

    fn try_from(row: GeneratedImageRow) -> Result<Self, Self::Error> {
        Ok(GeneratedImageRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            audiobook_id: Uuid::parse_str(&row.audiobook_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            timestamp_secs: row.timestamp_secs as u64,
            transcription: row.transcription,
            image_prompt: row.image_prompt,
            image_filename: row.image_filename,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, audiobook_id, timestamp_secs, transcription, image_prompt, image_filename, created_at";

#[async_trait]
impl GeneratedImageRepositoryPort for SqliteGeneratedImageRepository {
    async fn save(&self, image: &GeneratedImageRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO generated_images (id, audiobook_id, timestamp_secs, transcription, image_prompt, image_filename, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(image.id.to_string())
        .bind(image.audiobook_id.to_string())
        .bind(image.timestamp_secs as i64)
        .bind(&image.transcription)
        .bind(&image.image_prompt)
        .bind(&image.image_filename)
        .bind(image.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_audiobook(
        &self,
        audiobook_id: Uuid,
    ) -> Result<Vec<GeneratedImageRecord>, RepositoryError> {
        let rows: Vec<GeneratedImageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM generated_images WHERE audiobook_id = ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .bind(audiobook_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(GeneratedImageRecord::try_from)
            .collect()
    }

    async fn find_by_filename(
        &self,
        audiobook_id: Uuid,
        filename: &str,
    ) -> Result<Option<GeneratedImageRecord>, RepositoryError> {
        let row: Option<GeneratedImageRow> = sqlx::query_as(&format!(
            "SELECT {} FROM generated_images WHERE audiobook_id = ? AND image_filename = ?",
            SELECT_COLUMNS
        ))
        .bind(audiobook_id.to_string())
        .bind(filename)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(GeneratedImageRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{create_pool, run_migrations, DatabaseConfig, SqliteAudiobookRepository};
    use super::*;
    use crate::application::ports::{AudiobookRecord, AudiobookRepositoryPort};

    async fn repos() -> (SqliteAudiobookRepository, SqliteGeneratedImageRepository) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (
            SqliteAudiobookRepository::new(pool.clone()),
            SqliteGeneratedImageRepository::new(pool),
        )
    }

    async fn seed_audiobook(repo: &SqliteAudiobookRepository) -> Uuid {
        let record = AudiobookRecord {
            id: Uuid::new_v4(),
            original_name: "book.mp3".to_string(),
            stored_filename: "stored.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            style_prompt: "ink sketch".to_string(),
            duration_secs: Some(120),
            created_at: Utc::now(),
        };
        repo.save(&record).await.unwrap();
        record.id
    }

    fn sample_image(audiobook_id: Uuid, filename: &str) -> GeneratedImageRecord {
        GeneratedImageRecord {
            id: Uuid::new_v4(),
            audiobook_id,
            timestamp_secs: 90,
            transcription: "a quiet street".to_string(),
            image_prompt: "ink sketch, a quiet street".to_string(),
            image_filename: filename.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_audiobook() {
        let (audiobook_repo, image_repo) = repos().await;
        let audiobook_id = seed_audiobook(&audiobook_repo).await;

        image_repo
            .save(&sample_image(audiobook_id, "a.png"))
            .await
            .unwrap();
        image_repo
            .save(&sample_image(audiobook_id, "b.png"))
            .await
            .unwrap();

        let images = image_repo.find_by_audiobook(audiobook_id).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].timestamp_secs, 90);
    }

    #[tokio::test]
    async fn test_find_by_filename_checks_pairing() {
        let (audiobook_repo, image_repo) = repos().await;
        let audiobook_id = seed_audiobook(&audiobook_repo).await;
        let other_id = seed_audiobook(&audiobook_repo).await;

        image_repo
            .save(&sample_image(audiobook_id, "scene.png"))
            .await
            .unwrap();

        assert!(image_repo
            .find_by_filename(audiobook_id, "scene.png")
            .await
            .unwrap()
            .is_some());
        // 同名文件挂在别的有声书下不可见
        assert!(image_repo
            .find_by_filename(other_id, "scene.png")
            .await
            .unwrap()
            .is_none());
        assert!(image_repo
            .find_by_filename(audiobook_id, "missing.png")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_audiobook_delete_cascades_to_images() {
        let (audiobook_repo, image_repo) = repos().await;
        let audiobook_id = seed_audiobook(&audiobook_repo).await;

        image_repo
            .save(&sample_image(audiobook_id, "scene.png"))
            .await
            .unwrap();

        audiobook_repo.delete(audiobook_id).await.unwrap();

        assert!(image_repo
            .find_by_audiobook(audiobook_id)
            .await
            .unwrap()
            .is_empty());
    }
}
