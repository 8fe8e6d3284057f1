//! Fake Transcription Client - 测试用转写客户端
//!
//! 返回固定文本或 None（模拟转写不可用）

use async_trait::async_trait;

use crate::application::ports::{AudioSegment, TranscriptionEnginePort};

/// Fake Transcription Client
pub struct FakeTranscriptionClient {
    text: Option<String>,
}

impl FakeTranscriptionClient {
    /// text=None 模拟转写服务不可用
    pub fn new(text: Option<String>) -> Self {
        Self { text }
    }
}

#[async_trait]
impl TranscriptionEnginePort for FakeTranscriptionClient {
    async fn transcribe(&self, _segment: &AudioSegment) -> Option<String> {
        self.text.clone()
    }
}
