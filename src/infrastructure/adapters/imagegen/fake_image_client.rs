//! Fake Image Generation Client - 测试用图像生成客户端
//!
//! 返回固定字节，或在下载阶段模拟失败

use async_trait::async_trait;

use crate::application::ports::{GenerationError, ImageGeneratorPort};

/// Fake Image Generation Client
pub struct FakeImageGenClient {
    /// 固定返回的图片字节；None 表示模拟下载失败
    image_bytes: Option<Vec<u8>>,
}

impl FakeImageGenClient {
    /// 始终成功，返回给定字节
    pub fn succeeding(image_bytes: Vec<u8>) -> Self {
        Self {
            image_bytes: Some(image_bytes),
        }
    }

    /// 始终在下载阶段失败
    pub fn failing() -> Self {
        Self { image_bytes: None }
    }
}

#[async_trait]
impl ImageGeneratorPort for FakeImageGenClient {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, GenerationError> {
        match &self.image_bytes {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(GenerationError::DownloadFailed(
                "fake download failure".to_string(),
            )),
        }
    }
}
