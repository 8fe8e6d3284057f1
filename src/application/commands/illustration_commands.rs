//! Illustration Commands

use uuid::Uuid;

/// 为指定回放位置生成插图
#[derive(Debug, Clone)]
pub struct GenerateIllustration {
    pub audiobook_id: Uuid,
    /// 回放时间戳（秒，浮点）
    pub timestamp: f64,
}
