//! HTTP Routes
//!
//! API Endpoints:
//! - /health                                    GET     健康检查
//! - /audiobooks/upload                         POST    上传有声书（multipart: file + style_prompt）
//! - /audiobooks                                GET     列出所有有声书
//! - /audiobooks/{id}                           GET     有声书详情（含已生成图片）
//! - /audiobooks/{id}                           DELETE  删除有声书及所有文件
//! - /audiobooks/{id}/audio                     GET     音频流（支持 Range，200/206/416）
//! - /audiobooks/{id}/generate-image            POST    为指定时间戳生成插图（form: timestamp）
//! - /audiobooks/{id}/images/{filename}         GET     下载已生成的插图

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/audiobooks", audiobook_routes())
}

/// Audiobook 路由
fn audiobook_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_audiobooks))
        .route("/upload", post(handlers::upload_audiobook))
        .route(
            "/:audiobook_id",
            get(handlers::get_audiobook).delete(handlers::delete_audiobook),
        )
        .route("/:audiobook_id/audio", get(handlers::stream_audio))
        .route(
            "/:audiobook_id/generate-image",
            post(handlers::generate_image),
        )
        .route(
            "/:audiobook_id/images/:filename",
            get(handlers::get_generated_image),
        )
}
