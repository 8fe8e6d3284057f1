//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、MediaStorage、SegmentExtractor、
//!   TranscriptionEngine、ImageGenerator）
//! - commands: CQRS 命令及处理器（上传落库、删除、插图生成管线）
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义（管线错误按阶段打标）

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{CreateAudiobookHandler, DeleteAudiobookHandler, GenerateIllustrationHandler},
    CreateAudiobook, DeleteAudiobook, GenerateIllustration,
};

pub use error::{ApplicationError, PipelineStage};

pub use ports::{
    AudioSegment, AudiobookRecord, AudiobookRepositoryPort, ExtractionError, GeneratedImageRecord,
    GeneratedImageRepositoryPort, GenerationError, ImageGeneratorPort, MediaStorageError,
    MediaStoragePort, RepositoryError, SegmentExtractorPort, TranscriptionEnginePort,
};

pub use queries::{
    handlers::{
        AudiobookDetail, GetAudiobookHandler, GetGeneratedImageHandler, ListAudiobooksHandler,
    },
    GetAudiobook, GetGeneratedImage, ListAudiobooks,
};
