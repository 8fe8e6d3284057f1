//! Image Generator Port - 异步图像生成服务抽象
//!
//! 提交 Prompt 到外部异步生成任务，轮询至终态并下载结果。
//! 轮询有硬性次数上限，调用方依赖该上界规划自身超时预算。

use async_trait::async_trait;
use thiserror::Error;

/// 生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Generation job failed: {0}")]
    JobFailed(String),

    #[error("Job succeeded but returned no output")]
    EmptyOutput,

    #[error("Unknown job status: {0}")]
    UnknownStatus(String),

    #[error("Generation timed out after {attempts} poll attempts")]
    Timeout { attempts: u32 },

    #[error("Failed to download generated image: {0}")]
    DownloadFailed(String),
}

/// Image Generator Port
#[async_trait]
pub trait ImageGeneratorPort: Send + Sync {
    /// 生成一张插图，返回图片原始字节
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}
