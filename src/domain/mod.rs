//! 领域层
//!
//! Illustration Context: 插图生成上下文（时间戳、截取窗口、Prompt 组装）

pub mod illustration;

pub use illustration::{
    IllustrationPrompt, PlaybackTimestamp, SegmentWindow, TimestampError, MAX_TRANSCRIPT_CHARS,
    QUALITY_SUFFIX, SEGMENT_SECONDS,
};
