//! Audiobook Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{CreateAudiobook, DeleteAudiobook};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudiobookRecord, AudiobookRepositoryPort, GeneratedImageRepositoryPort, MediaStoragePort,
};

// ============================================================================
// CreateAudiobook
// ============================================================================

/// CreateAudiobook Handler - 持久化上传完成的有声书
pub struct CreateAudiobookHandler {
    audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
}

impl CreateAudiobookHandler {
    pub fn new(audiobook_repo: Arc<dyn AudiobookRepositoryPort>) -> Self {
        Self { audiobook_repo }
    }

    pub async fn handle(
        &self,
        command: CreateAudiobook,
    ) -> Result<AudiobookRecord, ApplicationError> {
        let audiobook = AudiobookRecord {
            id: Uuid::new_v4(),
            original_name: command.original_name,
            stored_filename: command.stored_filename,
            content_type: command.content_type,
            style_prompt: command.style_prompt,
            duration_secs: command.duration_secs,
            created_at: Utc::now(),
        };

        self.audiobook_repo.save(&audiobook).await?;

        tracing::info!(
            audiobook_id = %audiobook.id,
            original_name = %audiobook.original_name,
            duration_secs = ?audiobook.duration_secs,
            "Audiobook created"
        );

        Ok(audiobook)
    }
}

// ============================================================================
// DeleteAudiobook
// ============================================================================

/// DeleteAudiobook Handler - 删除记录及关联文件
pub struct DeleteAudiobookHandler {
    audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
    image_repo: Arc<dyn GeneratedImageRepositoryPort>,
    media_storage: Arc<dyn MediaStoragePort>,
}

impl DeleteAudiobookHandler {
    pub fn new(
        audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
        image_repo: Arc<dyn GeneratedImageRepositoryPort>,
        media_storage: Arc<dyn MediaStoragePort>,
    ) -> Self {
        Self {
            audiobook_repo,
            image_repo,
            media_storage,
        }
    }

    pub async fn handle(&self, command: DeleteAudiobook) -> Result<(), ApplicationError> {
        let audiobook_id = command.audiobook_id;

        let audiobook = self
            .audiobook_repo
            .find_by_id(audiobook_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Audiobook", audiobook_id))?;

        // 先取出图片列表，删除记录后仍需要文件名清理磁盘
        let images = self.image_repo.find_by_audiobook(audiobook_id).await?;

        // 数据库删除（图片记录随事务级联）
        self.audiobook_repo.delete(audiobook_id).await?;

        // 文件清理是尽力而为的，失败只告警不回滚
        let audio_path = self.media_storage.audio_path(&audiobook.stored_filename);
        if let Err(e) = self.media_storage.delete_file(&audio_path).await {
            tracing::warn!(
                audiobook_id = %audiobook_id,
                error = %e,
                "Failed to delete audio file"
            );
        }

        for image in &images {
            let image_path = self.media_storage.image_path(&image.image_filename);
            if let Err(e) = self.media_storage.delete_file(&image_path).await {
                tracing::warn!(
                    audiobook_id = %audiobook_id,
                    filename = %image.image_filename,
                    error = %e,
                    "Failed to delete image file"
                );
            }
        }

        tracing::info!(
            audiobook_id = %audiobook_id,
            original_name = %audiobook.original_name,
            images = images.len(),
            "Audiobook deleted"
        );

        Ok(())
    }
}
