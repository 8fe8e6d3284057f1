//! Audio Streaming Handler - 字节区间感知的音频回放端点
//!
//! Range 解析与响应构建在 http/range.rs，这里只负责把记录解析成
//! 文件路径并校验存在性。

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{AudiobookRepositoryPort, MediaStoragePort};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::range::range_response;
use crate::infrastructure::http::state::AppState;

/// 流式播放有声书音频，支持 `Range: bytes=<start>-[<end>]` 拖动定位
pub async fn stream_audio(
    State(state): State<Arc<AppState>>,
    Path(audiobook_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let audiobook = state
        .audiobook_repo
        .find_by_id(audiobook_id)
        .await
        .map_err(|e| ApiError::Internal(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::NotFound(format!("Audiobook not found: {}", audiobook_id)))?;

    let audio_path = state.media_storage.audio_path(&audiobook.stored_filename);
    if !audio_path.exists() {
        tracing::warn!(
            audiobook_id = %audiobook_id,
            filename = %audiobook.stored_filename,
            "Audiobook record exists but audio file is missing"
        );
        return Err(ApiError::NotFound(format!(
            "Audio file not found: {}",
            audiobook_id
        )));
    }

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    range_response(&audio_path, &audiobook.content_type, range_header).await
}
