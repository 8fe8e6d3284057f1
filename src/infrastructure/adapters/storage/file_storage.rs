//! File Media Storage - 文件系统媒体存储实现
//!
//! 实现 MediaStoragePort trait：上传音频与生成图片分目录存放

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{MediaStorageError, MediaStoragePort};

/// 文件系统媒体存储
pub struct FileMediaStorage {
    /// 上传音频目录
    audio_dir: PathBuf,
    /// 生成图片目录
    images_dir: PathBuf,
}

impl FileMediaStorage {
    /// 创建新的文件存储，确保两个目录存在
    pub async fn new(
        audio_dir: impl AsRef<Path>,
        images_dir: impl AsRef<Path>,
    ) -> Result<Self, MediaStorageError> {
        let audio_dir = audio_dir.as_ref().to_path_buf();
        let images_dir = images_dir.as_ref().to_path_buf();

        fs::create_dir_all(&audio_dir)
            .await
            .map_err(|e| MediaStorageError::IoError(e.to_string()))?;
        fs::create_dir_all(&images_dir)
            .await
            .map_err(|e| MediaStorageError::IoError(e.to_string()))?;

        Ok(Self {
            audio_dir,
            images_dir,
        })
    }
}

#[async_trait]
impl MediaStoragePort for FileMediaStorage {
    fn audio_path(&self, stored_filename: &str) -> PathBuf {
        self.audio_dir.join(stored_filename)
    }

    fn image_path(&self, filename: &str) -> PathBuf {
        self.images_dir.join(filename)
    }

    async fn save_audio(
        &self,
        stored_filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, MediaStorageError> {
        let path = self.audio_path(stored_filename);

        fs::write(&path, data)
            .await
            .map_err(|e| MediaStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            filename = %stored_filename,
            size = data.len(),
            "Saved audio file"
        );

        Ok(path)
    }

    async fn save_image(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, MediaStorageError> {
        let path = self.image_path(filename);

        fs::write(&path, data)
            .await
            .map_err(|e| MediaStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            filename = %filename,
            size = data.len(),
            "Saved generated image"
        );

        Ok(path)
    }

    async fn delete_file(&self, path: &Path) -> Result<bool, MediaStorageError> {
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(path)
            .await
            .map_err(|e| MediaStorageError::IoError(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Deleted file");

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(temp: &tempfile::TempDir) -> FileMediaStorage {
        FileMediaStorage::new(temp.path().join("audio"), temp.path().join("images"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_audio_and_resolve_path() {
        let temp = tempdir().unwrap();
        let storage = storage(&temp).await;

        let path = storage.save_audio("book.mp3", b"audio bytes").await.unwrap();
        assert!(path.exists());
        assert_eq!(path, storage.audio_path("book.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"audio bytes");
    }

    #[tokio::test]
    async fn test_save_image_goes_to_images_dir() {
        let temp = tempdir().unwrap();
        let storage = storage(&temp).await;

        let path = storage.save_image("scene.png", b"png").await.unwrap();
        assert!(path.starts_with(temp.path().join("images")));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_delete_file() {
        let temp = tempdir().unwrap();
        let storage = storage(&temp).await;

        let path = storage.save_image("scene.png", b"png").await.unwrap();
        assert!(storage.delete_file(&path).await.unwrap());
        assert!(!path.exists());

        // 再删一次：不存在返回 false 而不是错误
        assert!(!storage.delete_file(&path).await.unwrap());
    }
}
