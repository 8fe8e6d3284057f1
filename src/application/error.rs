//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。管线错误按阶段打标，便于区分
//! "我们的 bug" 与 "外部服务不可用"。

use thiserror::Error;
use uuid::Uuid;

use super::ports::{ExtractionError, GenerationError, MediaStorageError, RepositoryError};
use crate::domain::TimestampError;

/// 插图管线阶段（用于错误打标与日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extraction,
    Transcription,
    Prompt,
    Generation,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Extraction => "extraction",
            PipelineStage::Transcription => "transcription",
            PipelineStage::Prompt => "prompt",
            PipelineStage::Generation => "generation",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 管线阶段错误
    #[error("Pipeline stage '{stage}' failed: {message}")]
    Pipeline {
        stage: PipelineStage,
        message: String,
    },

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<MediaStorageError> for ApplicationError {
    fn from(err: MediaStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<TimestampError> for ApplicationError {
    fn from(err: TimestampError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<ExtractionError> for ApplicationError {
    fn from(err: ExtractionError) -> Self {
        Self::Pipeline {
            stage: PipelineStage::Extraction,
            message: err.to_string(),
        }
    }
}

impl From<GenerationError> for ApplicationError {
    fn from(err: GenerationError) -> Self {
        Self::Pipeline {
            stage: PipelineStage::Generation,
            message: err.to_string(),
        }
    }
}
