//! Transcription Port - 语音转写抽象
//!
//! 转写是尽力而为的软依赖：外部服务失败、凭证缺失或结果为空时返回
//! None，由编排方改用回退文案。错误从不向管线传播。

use async_trait::async_trait;

use super::segment_extractor::AudioSegment;

/// Transcription Engine Port
#[async_trait]
pub trait TranscriptionEnginePort: Send + Sync {
    /// 转写片段，返回去除首尾空白的文本
    ///
    /// 失败时返回 None（调用方使用回退文案），不返回错误
    async fn transcribe(&self, segment: &AudioSegment) -> Option<String>;
}
