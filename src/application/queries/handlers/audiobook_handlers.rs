//! Audiobook Query Handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudiobookRecord, AudiobookRepositoryPort, GeneratedImageRecord,
    GeneratedImageRepositoryPort, MediaStoragePort,
};
use crate::application::queries::{GetAudiobook, GetGeneratedImage, ListAudiobooks};

// ============================================================================
// GetAudiobook
// ============================================================================

/// 有声书详情（含图片列表）
#[derive(Debug, Clone)]
pub struct AudiobookDetail {
    pub audiobook: AudiobookRecord,
    pub images: Vec<GeneratedImageRecord>,
}

/// GetAudiobook Handler
pub struct GetAudiobookHandler {
    audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
    image_repo: Arc<dyn GeneratedImageRepositoryPort>,
}

impl GetAudiobookHandler {
    pub fn new(
        audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
        image_repo: Arc<dyn GeneratedImageRepositoryPort>,
    ) -> Self {
        Self {
            audiobook_repo,
            image_repo,
        }
    }

    pub async fn handle(&self, query: GetAudiobook) -> Result<AudiobookDetail, ApplicationError> {
        let audiobook = self
            .audiobook_repo
            .find_by_id(query.audiobook_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Audiobook", query.audiobook_id))?;

        let images = self.image_repo.find_by_audiobook(query.audiobook_id).await?;

        Ok(AudiobookDetail { audiobook, images })
    }
}

// ============================================================================
// ListAudiobooks
// ============================================================================

/// ListAudiobooks Handler
pub struct ListAudiobooksHandler {
    audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
}

impl ListAudiobooksHandler {
    pub fn new(audiobook_repo: Arc<dyn AudiobookRepositoryPort>) -> Self {
        Self { audiobook_repo }
    }

    pub async fn handle(
        &self,
        _query: ListAudiobooks,
    ) -> Result<Vec<AudiobookRecord>, ApplicationError> {
        Ok(self.audiobook_repo.find_all().await?)
    }
}

// ============================================================================
// GetGeneratedImage
// ============================================================================

/// GetGeneratedImage Handler - 校验 (audiobook, filename) 归属并解析文件路径
pub struct GetGeneratedImageHandler {
    image_repo: Arc<dyn GeneratedImageRepositoryPort>,
    media_storage: Arc<dyn MediaStoragePort>,
}

impl GetGeneratedImageHandler {
    pub fn new(
        image_repo: Arc<dyn GeneratedImageRepositoryPort>,
        media_storage: Arc<dyn MediaStoragePort>,
    ) -> Self {
        Self {
            image_repo,
            media_storage,
        }
    }

    pub async fn handle(
        &self,
        query: GetGeneratedImage,
    ) -> Result<(GeneratedImageRecord, PathBuf), ApplicationError> {
        // 带路径分隔符的文件名不可能是我们生成的，按"不存在"处理
        if query.filename.contains('/') || query.filename.contains('\\') {
            tracing::warn!(
                audiobook_id = %query.audiobook_id,
                filename = %query.filename,
                "Rejected image filename with path separators"
            );
            return Err(ApplicationError::not_found(
                "GeneratedImage",
                query.audiobook_id,
            ));
        }

        let record = self
            .image_repo
            .find_by_filename(query.audiobook_id, &query.filename)
            .await?
            .ok_or_else(|| {
                ApplicationError::not_found("GeneratedImage", query.audiobook_id)
            })?;

        let path = self.media_storage.image_path(&record.image_filename);
        if !path.exists() {
            tracing::warn!(
                audiobook_id = %query.audiobook_id,
                filename = %record.image_filename,
                "Image record exists but file is missing"
            );
            return Err(ApplicationError::not_found(
                "GeneratedImage",
                query.audiobook_id,
            ));
        }

        Ok((record, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::infrastructure::adapters::FileMediaStorage;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteGeneratedImageRepository,
    };

    struct ImageQueryEnv {
        handler: GetGeneratedImageHandler,
        image_repo: Arc<SqliteGeneratedImageRepository>,
        _temp: tempfile::TempDir,
    }

    async fn image_query_env() -> ImageQueryEnv {
        let temp = tempfile::tempdir().unwrap();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let image_repo = Arc::new(SqliteGeneratedImageRepository::new(pool));
        let media_storage = Arc::new(
            FileMediaStorage::new(temp.path().join("audio"), temp.path().join("images"))
                .await
                .unwrap(),
        );

        ImageQueryEnv {
            handler: GetGeneratedImageHandler::new(image_repo.clone(), media_storage),
            image_repo,
            _temp: temp,
        }
    }

    #[tokio::test]
    async fn test_filename_with_path_separator_is_not_found() {
        let env = image_query_env().await;

        for filename in ["../../etc/passwd", "a/b.png", "a\\b.png"] {
            let err = env
                .handler
                .handle(GetGeneratedImage {
                    audiobook_id: Uuid::new_v4(),
                    filename: filename.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::NotFound { .. }));
        }
    }

    #[tokio::test]
    async fn test_record_without_file_is_not_found() {
        let env = image_query_env().await;
        let audiobook_id = Uuid::new_v4();

        // 记录存在但磁盘文件缺失
        let record = GeneratedImageRecord {
            id: Uuid::new_v4(),
            audiobook_id,
            timestamp_secs: 10,
            transcription: "text".to_string(),
            image_prompt: "prompt".to_string(),
            image_filename: "missing.png".to_string(),
            created_at: Utc::now(),
        };
        env.image_repo.save(&record).await.unwrap();

        let err = env
            .handler
            .handle(GetGeneratedImage {
                audiobook_id,
                filename: "missing.png".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
