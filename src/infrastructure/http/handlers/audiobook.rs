//! Audiobook HTTP Handlers - 上传、列表、详情、删除
//!
//! 上传在 HTTP 层完成校验（MIME 白名单、大小上限）与落盘，
//! 记录持久化交给应用层命令处理器。

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{MediaStoragePort, SegmentExtractorPort};
use crate::application::{CreateAudiobook, DeleteAudiobook, GetAudiobook, ListAudiobooks};
use crate::infrastructure::http::dto::{
    ApiResponse, AudiobookDetailResponse, AudiobookResponse, Empty,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 上传表单解析结果
struct UploadForm {
    original_name: String,
    content_type: String,
    style_prompt: String,
    data: Vec<u8>,
}

/// 上传有声书（multipart: file + style_prompt）
pub async fn upload_audiobook(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AudiobookResponse>>, ApiError> {
    let form = read_upload_form(&state, multipart).await?;

    // UUID 文件名防碰撞，保留原始扩展名供容器格式识别
    let extension = file_extension(&form.original_name, &form.content_type);
    let stored_filename = format!("{}.{}", Uuid::new_v4(), extension);

    let audio_path = state
        .media_storage
        .save_audio(&stored_filename, &form.data)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store audio: {}", e)))?;

    // 时长探测是软失败：探测不到只是记录里少个时长，不阻断上传
    let duration_secs = match state.segment_extractor.probe_duration(&audio_path).await {
        Ok(secs) => Some(secs as u64),
        Err(e) => {
            tracing::warn!(
                filename = %stored_filename,
                error = %e,
                "Failed to probe audio duration"
            );
            None
        }
    };

    let command = CreateAudiobook {
        original_name: form.original_name,
        stored_filename,
        content_type: form.content_type,
        style_prompt: form.style_prompt,
        duration_secs,
    };

    let audiobook = state.create_audiobook_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(AudiobookResponse::from(
        audiobook,
    ))))
}

/// 读取并校验 multipart 上传表单
async fn read_upload_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadForm, ApiError> {
    let mut style_prompt: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "style_prompt" => {
                style_prompt = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read style_prompt: {}", e))
                })?);
            }
            "file" => {
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "audiobook".to_string());

                let declared_type = field.content_type().map(|s| s.to_string());

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

                if bytes.len() as u64 > state.upload_policy.max_upload_size {
                    return Err(ApiError::BadRequest(format!(
                        "File too large. Maximum size is {} MB",
                        state.upload_policy.max_upload_size / 1024 / 1024
                    )));
                }

                let content_type = declared_type
                    .or_else(|| content_type_from_name(&original_name).map(str::to_string))
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                if !state.upload_policy.is_allowed(&content_type) {
                    return Err(ApiError::BadRequest(format!(
                        "Unsupported audio type: {}",
                        content_type
                    )));
                }

                file = Some((original_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (original_name, content_type, data) =
        file.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;

    let style_prompt = style_prompt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("style_prompt is required".to_string()))?;

    if data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    Ok(UploadForm {
        original_name,
        content_type,
        style_prompt,
        data,
    })
}

/// 按文件名推断 MIME 类型（浏览器未声明时的兜底）
fn content_type_from_name(name: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();

    match ext.as_str() {
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "ogg" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        "aac" => Some("audio/aac"),
        _ => None,
    }
}

/// 落盘文件的扩展名：优先用原始文件名，再从 MIME 类型映射
fn file_extension(original_name: &str, content_type: &str) -> String {
    if let Some(ext) = std::path::Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
    {
        return ext.to_lowercase();
    }

    match content_type {
        "audio/mpeg" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mp4" => "m4a",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/aac" => "aac",
        _ => "bin",
    }
    .to_string()
}

/// 获取有声书列表
pub async fn list_audiobooks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AudiobookResponse>>>, ApiError> {
    let result = state.list_audiobooks_handler.handle(ListAudiobooks).await?;

    let responses: Vec<AudiobookResponse> =
        result.into_iter().map(AudiobookResponse::from).collect();

    Ok(Json(ApiResponse::success(responses)))
}

/// 获取有声书详情（含已生成图片）
pub async fn get_audiobook(
    State(state): State<Arc<AppState>>,
    Path(audiobook_id): Path<Uuid>,
) -> Result<Json<ApiResponse<AudiobookDetailResponse>>, ApiError> {
    let detail = state
        .get_audiobook_handler
        .handle(GetAudiobook { audiobook_id })
        .await?;

    Ok(Json(ApiResponse::success(AudiobookDetailResponse::from(
        detail,
    ))))
}

/// 删除有声书及其音频文件、生成图片
pub async fn delete_audiobook(
    State(state): State<Arc<AppState>>,
    Path(audiobook_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_audiobook_handler
        .handle(DeleteAudiobook { audiobook_id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_name() {
        assert_eq!(content_type_from_name("book.mp3"), Some("audio/mpeg"));
        assert_eq!(content_type_from_name("book.M4A"), Some("audio/mp4"));
        assert_eq!(content_type_from_name("book.txt"), None);
        assert_eq!(content_type_from_name("noext"), None);
    }

    #[test]
    fn test_file_extension_prefers_original_name() {
        assert_eq!(file_extension("book.MP3", "audio/wav"), "mp3");
        assert_eq!(file_extension("book", "audio/mpeg"), "mp3");
        assert_eq!(file_extension("book", "application/octet-stream"), "bin");
    }
}
