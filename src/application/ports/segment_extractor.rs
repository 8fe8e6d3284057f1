//! Segment Extractor Port - 音频片段截取抽象
//!
//! 调用外部转码工具从源音频截取归一化片段（16kHz 单声道 WAV），
//! 供语音转写消费。具体实现在 infrastructure/adapters 层。

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 截取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Source audio not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to launch transcoder: {0}")]
    SpawnFailed(String),

    #[error("Transcoder exited with status {status}: {stderr}")]
    TranscoderFailed { status: i32, stderr: String },

    #[error("Transcoder produced malformed output: {0}")]
    MalformedOutput(String),

    #[error("Transcoder timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 截取出的音频片段
///
/// 16kHz 单声道 WAV，时长有界（≤ 截取窗口）。转写消费一次后即丢弃，
/// 从不进入持久存储。
#[derive(Debug, Clone)]
pub struct AudioSegment {
    /// WAV 容器字节
    pub data: Vec<u8>,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
    /// 实际时长（秒），由容器解析得出
    pub duration_secs: f64,
}

/// Segment Extractor Port
#[async_trait]
pub trait SegmentExtractorPort: Send + Sync {
    /// 截取 `[start, start+duration)` 并重编码为 16kHz 单声道 WAV
    ///
    /// 成功时返回完整片段字节；子进程失败、输出损坏或源文件缺失时
    /// 返回明确错误，绝不把截断的字节当作成功结果。
    async fn extract(
        &self,
        source: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> Result<AudioSegment, ExtractionError>;

    /// 探测源音频总时长（秒）
    async fn probe_duration(&self, source: &Path) -> Result<f64, ExtractionError>;
}
