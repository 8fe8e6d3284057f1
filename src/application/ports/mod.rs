//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod image_generator;
mod media_storage;
mod repositories;
mod segment_extractor;
mod transcription;

pub use image_generator::{GenerationError, ImageGeneratorPort};
pub use media_storage::{MediaStorageError, MediaStoragePort};
pub use repositories::{
    AudiobookRecord, AudiobookRepositoryPort, GeneratedImageRecord, GeneratedImageRepositoryPort,
    RepositoryError,
};
pub use segment_extractor::{AudioSegment, ExtractionError, SegmentExtractorPort};
pub use transcription::TranscriptionEnginePort;
