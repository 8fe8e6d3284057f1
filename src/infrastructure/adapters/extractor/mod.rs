//! Extractor Adapters

mod fake_extractor;
mod ffmpeg_extractor;

pub use fake_extractor::FakeSegmentExtractor;
pub use ffmpeg_extractor::{FfmpegExtractorConfig, FfmpegSegmentExtractor};
