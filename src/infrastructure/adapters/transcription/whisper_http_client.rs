//! Whisper HTTP Client - 调用外部语音转写服务
//!
//! 实现 TranscriptionEnginePort trait，通过 HTTP multipart 上传 WAV 片段
//!
//! 外部转写 API（OpenAI 兼容）:
//! POST {base}/audio/transcriptions
//! Form: file=<wav bytes>, model=whisper-1, response_format=text
//! Response: 纯文本转写结果
//!
//! 转写是尽力而为的：凭证缺失、网络错误、非 2xx 响应或空结果一律
//! 返回 None（上层改用回退文案），绝不让转写失败打断插图管线。

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{AudioSegment, TranscriptionEnginePort};

/// Whisper HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct WhisperHttpClientConfig {
    /// 转写服务基础 URL
    pub api_base: String,
    /// API Key；None 或空串表示未配置，直接走回退
    pub api_key: Option<String>,
    /// 转写模型
    pub model: String,
    /// 请求超时时间（秒），转写属于软依赖，超时宜短
    pub timeout_secs: u64,
}

impl Default for WhisperHttpClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Whisper HTTP 客户端
pub struct WhisperHttpClient {
    client: Client,
    config: WhisperHttpClientConfig,
}

impl WhisperHttpClient {
    pub fn new(config: WhisperHttpClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.config.api_base)
    }
}

#[async_trait]
impl TranscriptionEnginePort for WhisperHttpClient {
    async fn transcribe(&self, segment: &AudioSegment) -> Option<String> {
        let Some(api_key) = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
        else {
            tracing::warn!("Transcription API key not configured, skipping transcription");
            return None;
        };

        let part = match reqwest::multipart::Part::bytes(segment.data.clone())
            .file_name("segment.wav")
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build transcription request part");
                return None;
            }
        };

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "text");

        tracing::debug!(
            url = %self.transcriptions_url(),
            segment_size = segment.data.len(),
            segment_secs = segment.duration_secs,
            "Sending transcription request"
        );

        let response = match self
            .client
            .post(self.transcriptions_url())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Transcription request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                "Transcription service returned error"
            );
            return None;
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read transcription response");
                return None;
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::warn!("Transcription service returned empty text");
            return None;
        }

        tracing::info!(chars = trimmed.chars().count(), "Transcription completed");

        Some(trimmed.to_string())
    }
}
