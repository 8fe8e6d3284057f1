//! Media Storage Port - 出站端口
//!
//! 管理上传音频与生成图片的文件存储

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 媒体存储错误
#[derive(Debug, Error)]
pub enum MediaStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Media Storage Port
#[async_trait]
pub trait MediaStoragePort: Send + Sync {
    /// 音频文件的存储路径
    fn audio_path(&self, stored_filename: &str) -> PathBuf;

    /// 图片文件的存储路径
    fn image_path(&self, filename: &str) -> PathBuf;

    /// 保存上传的音频
    async fn save_audio(
        &self,
        stored_filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, MediaStorageError>;

    /// 保存生成的图片
    async fn save_image(&self, filename: &str, data: &[u8])
        -> Result<PathBuf, MediaStorageError>;

    /// 删除文件，返回是否实际删除
    async fn delete_file(&self, path: &Path) -> Result<bool, MediaStorageError>;
}
