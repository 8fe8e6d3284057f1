//! Audiobook Commands

use uuid::Uuid;

/// 创建有声书记录（音频文件已由 HTTP 层校验并落盘）
#[derive(Debug, Clone)]
pub struct CreateAudiobook {
    pub original_name: String,
    pub stored_filename: String,
    pub content_type: String,
    pub style_prompt: String,
    /// 探测到的总时长（秒），探测失败时为 None
    pub duration_secs: Option<u64>,
}

/// 删除有声书及其所有文件
#[derive(Debug, Clone)]
pub struct DeleteAudiobook {
    pub audiobook_id: Uuid,
}
