//! Audiobook Queries

use uuid::Uuid;

/// 查询有声书详情（含已生成图片）
#[derive(Debug, Clone)]
pub struct GetAudiobook {
    pub audiobook_id: Uuid,
}

/// 列出全部有声书
#[derive(Debug, Clone)]
pub struct ListAudiobooks;

/// 查询生成图片文件（校验归属关系）
#[derive(Debug, Clone)]
pub struct GetGeneratedImage {
    pub audiobook_id: Uuid,
    pub filename: String,
}
