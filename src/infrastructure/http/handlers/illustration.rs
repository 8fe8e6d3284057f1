//! Illustration HTTP Handlers - 插图生成与图片下载
//!
//! 生成端点同步等待整条管线（截取 → 转写 → Prompt → 生成）跑完，
//! 生成服务的轮询上限保证了端点自身的时延有界。

use axum::{
    body::Body,
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::application::{GenerateIllustration, GetGeneratedImage};
use crate::infrastructure::http::dto::{ApiResponse, GeneratedImageResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    /// 回放时间戳（秒，浮点）
    pub timestamp: f64,
}

/// 为指定回放位置生成一张插图
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Path(audiobook_id): Path<Uuid>,
    Form(req): Form<GenerateImageRequest>,
) -> Result<Json<ApiResponse<GeneratedImageResponse>>, ApiError> {
    let command = GenerateIllustration {
        audiobook_id,
        timestamp: req.timestamp,
    };

    let record = state.generate_illustration_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(GeneratedImageResponse::from(
        record,
    ))))
}

/// 下载此前生成的插图；(audiobook, filename) 归属不符或文件缺失时 404
pub async fn get_generated_image(
    State(state): State<Arc<AppState>>,
    Path((audiobook_id, filename)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let (record, image_path) = state
        .get_generated_image_handler
        .handle(GetGeneratedImage {
            audiobook_id,
            filename,
        })
        .await?;

    let file = tokio::fs::File::open(&image_path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open image file: {}", e)))?;

    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read image metadata: {}", e)))?
        .len();

    let content_type = match image_path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };

    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", record.image_filename),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
