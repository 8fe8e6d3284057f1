//! Data Transfer Objects

use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::{AudiobookRecord, GeneratedImageRecord};
use crate::application::AudiobookDetail;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Audiobook DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AudiobookResponse {
    pub id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub style_prompt: String,
    pub duration_secs: Option<u64>,
    pub created_at: String,
}

impl From<AudiobookRecord> for AudiobookResponse {
    fn from(record: AudiobookRecord) -> Self {
        Self {
            id: record.id,
            original_name: record.original_name,
            content_type: record.content_type,
            style_prompt: record.style_prompt,
            duration_secs: record.duration_secs,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AudiobookDetailResponse {
    pub id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub style_prompt: String,
    pub duration_secs: Option<u64>,
    pub created_at: String,
    pub images: Vec<GeneratedImageResponse>,
}

impl From<AudiobookDetail> for AudiobookDetailResponse {
    fn from(detail: AudiobookDetail) -> Self {
        Self {
            id: detail.audiobook.id,
            original_name: detail.audiobook.original_name,
            content_type: detail.audiobook.content_type,
            style_prompt: detail.audiobook.style_prompt,
            duration_secs: detail.audiobook.duration_secs,
            created_at: detail.audiobook.created_at.to_rfc3339(),
            images: detail
                .images
                .into_iter()
                .map(GeneratedImageResponse::from)
                .collect(),
        }
    }
}

// ============================================================================
// Generated Image DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GeneratedImageResponse {
    pub id: Uuid,
    pub audiobook_id: Uuid,
    pub timestamp_secs: u64,
    pub transcription: String,
    pub image_prompt: String,
    pub image_filename: String,
    pub created_at: String,
}

impl From<GeneratedImageRecord> for GeneratedImageResponse {
    fn from(record: GeneratedImageRecord) -> Self {
        Self {
            id: record.id,
            audiobook_id: record.audiobook_id,
            timestamp_secs: record.timestamp_secs,
            transcription: record.transcription,
            image_prompt: record.image_prompt,
            image_filename: record.image_filename,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}
