//! Illustration Context - 插图生成上下文

mod value_objects;

pub use value_objects::{
    IllustrationPrompt, PlaybackTimestamp, SegmentWindow, TimestampError, MAX_TRANSCRIPT_CHARS,
    QUALITY_SUFFIX, SEGMENT_SECONDS,
};
