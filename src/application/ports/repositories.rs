//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 有声书实体（用于持久化）
///
/// 音频字节落在磁盘上，记录只保存 stored_filename，
/// 实际路径通过 MediaStoragePort 解析
#[derive(Debug, Clone)]
pub struct AudiobookRecord {
    pub id: Uuid,
    pub original_name: String,
    pub stored_filename: String,
    pub content_type: String,
    pub style_prompt: String,
    pub duration_secs: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// 生成图片实体
#[derive(Debug, Clone)]
pub struct GeneratedImageRecord {
    pub id: Uuid,
    pub audiobook_id: Uuid,
    pub timestamp_secs: u64,
    pub transcription: String,
    pub image_prompt: String,
    pub image_filename: String,
    pub created_at: DateTime<Utc>,
}

/// Audiobook Repository Port
#[async_trait]
pub trait AudiobookRepositoryPort: Send + Sync {
    /// 保存有声书
    async fn save(&self, audiobook: &AudiobookRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找有声书
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AudiobookRecord>, RepositoryError>;

    /// 获取所有有声书（按创建时间倒序）
    async fn find_all(&self) -> Result<Vec<AudiobookRecord>, RepositoryError>;

    /// 删除有声书及其关联的图片记录
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// Generated Image Repository Port
#[async_trait]
pub trait GeneratedImageRepositoryPort: Send + Sync {
    /// 保存生成图片记录
    async fn save(&self, image: &GeneratedImageRecord) -> Result<(), RepositoryError>;

    /// 获取某本有声书的所有图片（按创建时间倒序）
    async fn find_by_audiobook(
        &self,
        audiobook_id: Uuid,
    ) -> Result<Vec<GeneratedImageRecord>, RepositoryError>;

    /// 校验 (audiobook, filename) 归属关系并返回记录
    async fn find_by_filename(
        &self,
        audiobook_id: Uuid,
        filename: &str,
    ) -> Result<Option<GeneratedImageRecord>, RepositoryError>;
}
