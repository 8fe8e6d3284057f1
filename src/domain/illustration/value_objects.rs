//! Illustration Value Objects - 插图领域值对象
//!
//! 纯值类型：播放时间戳、截取窗口、插图 Prompt。
//! 全部为无副作用的确定性计算，是单元测试的主要对象。

use thiserror::Error;

/// 截取片段时长（秒），窗口始终结束于请求的时间戳
pub const SEGMENT_SECONDS: f64 = 30.0;

/// Prompt 中转写文本的最大长度（字符）
pub const MAX_TRANSCRIPT_CHARS: usize = 200;

/// 固定画质修饰词，追加在所有 Prompt 末尾
pub const QUALITY_SUFFIX: &str = "highly detailed, professional quality, artistic composition";

/// 时间戳校验错误
#[derive(Debug, Error, PartialEq)]
pub enum TimestampError {
    #[error("Timestamp must be a finite number, got {0}")]
    NotFinite(f64),

    #[error("Timestamp must be >= 0, got {0}")]
    Negative(f64),
}

/// 播放时间戳（秒）
///
/// 构造时校验：必须是有限的非负浮点数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTimestamp(f64);

impl PlaybackTimestamp {
    pub fn new(secs: f64) -> Result<Self, TimestampError> {
        if !secs.is_finite() {
            return Err(TimestampError::NotFinite(secs));
        }
        if secs < 0.0 {
            return Err(TimestampError::Negative(secs));
        }
        Ok(Self(secs))
    }

    /// 原始秒数
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// 整秒（向下取整）
    pub fn as_secs(&self) -> u64 {
        self.0 as u64
    }

    /// 计算截取窗口
    ///
    /// 窗口结束于当前时间戳，起点为 max(0, t - 30)。
    /// 时间戳落在前 30 秒内时窗口从文件开头算起，绝不会出现负的起点。
    pub fn extraction_window(&self) -> SegmentWindow {
        SegmentWindow {
            start_secs: (self.0 - SEGMENT_SECONDS).max(0.0),
            duration_secs: SEGMENT_SECONDS,
        }
    }

    /// MM:SS 格式（分、秒各补零到两位）
    pub fn as_mmss(&self) -> String {
        let total = self.as_secs();
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// 转写不可用时的回退文案
    pub fn fallback_transcript(&self) -> String {
        format!(
            "Audio content at {} - transcription unavailable",
            self.as_mmss()
        )
    }
}

/// 截取窗口（起点 + 时长，秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentWindow {
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// 插图生成 Prompt
///
/// 由风格描述 + 截断后的转写文本 + 固定画质修饰词拼接而成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustrationPrompt(String);

impl IllustrationPrompt {
    /// 组装 Prompt
    ///
    /// 转写文本先去除首尾空白，超过 [`MAX_TRANSCRIPT_CHARS`] 个字符时
    /// 按字符边界截断并追加 "..."。相同输入产生字节一致的输出。
    pub fn compose(style_prompt: &str, transcript: &str) -> Self {
        let trimmed = transcript.trim();
        let clipped = if trimmed.chars().count() > MAX_TRANSCRIPT_CHARS {
            let head: String = trimmed.chars().take(MAX_TRANSCRIPT_CHARS).collect();
            format!("{}...", head)
        } else {
            trimmed.to_string()
        };

        Self(format!("{}, {}, {}", style_prompt, clipped, QUALITY_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for IllustrationPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_rejects_negative_and_non_finite() {
        assert_eq!(
            PlaybackTimestamp::new(-5.0),
            Err(TimestampError::Negative(-5.0))
        );
        assert!(matches!(
            PlaybackTimestamp::new(f64::NAN),
            Err(TimestampError::NotFinite(_))
        ));
        assert!(matches!(
            PlaybackTimestamp::new(f64::INFINITY),
            Err(TimestampError::NotFinite(_))
        ));
        assert!(PlaybackTimestamp::new(0.0).is_ok());
    }

    #[test]
    fn test_window_clamped_at_file_start() {
        // t=10 → [0, 30)，而不是 [-20, 10)
        let window = PlaybackTimestamp::new(10.0).unwrap().extraction_window();
        assert_eq!(window.start_secs, 0.0);
        assert_eq!(window.duration_secs, SEGMENT_SECONDS);
    }

    #[test]
    fn test_window_ends_at_timestamp() {
        // t=90 → [60, 90)
        let window = PlaybackTimestamp::new(90.0).unwrap().extraction_window();
        assert_eq!(window.start_secs, 60.0);
        assert_eq!(window.duration_secs, SEGMENT_SECONDS);
    }

    #[test]
    fn test_mmss_zero_padding() {
        assert_eq!(PlaybackTimestamp::new(125.0).unwrap().as_mmss(), "02:05");
        assert_eq!(PlaybackTimestamp::new(59.9).unwrap().as_mmss(), "00:59");
        assert_eq!(PlaybackTimestamp::new(0.0).unwrap().as_mmss(), "00:00");
        assert_eq!(PlaybackTimestamp::new(3600.0).unwrap().as_mmss(), "60:00");
    }

    #[test]
    fn test_fallback_transcript_format() {
        assert_eq!(
            PlaybackTimestamp::new(125.0).unwrap().fallback_transcript(),
            "Audio content at 02:05 - transcription unavailable"
        );
        assert!(PlaybackTimestamp::new(59.9)
            .unwrap()
            .fallback_transcript()
            .contains("00:59"));
    }

    #[test]
    fn test_prompt_compose_short_transcript() {
        let prompt = IllustrationPrompt::compose("watercolor", "a quiet forest");
        assert_eq!(
            prompt.as_str(),
            format!("watercolor, a quiet forest, {}", QUALITY_SUFFIX)
        );
    }

    #[test]
    fn test_prompt_trims_whitespace() {
        let prompt = IllustrationPrompt::compose("oil painting", "  windy harbor  ");
        assert_eq!(
            prompt.as_str(),
            format!("oil painting, windy harbor, {}", QUALITY_SUFFIX)
        );
    }

    #[test]
    fn test_prompt_truncates_only_above_limit() {
        let exactly_200: String = "a".repeat(MAX_TRANSCRIPT_CHARS);
        let prompt = IllustrationPrompt::compose("ink", &exactly_200);
        assert!(!prompt.as_str().contains("..."));

        let over_limit: String = "b".repeat(MAX_TRANSCRIPT_CHARS + 1);
        let prompt = IllustrationPrompt::compose("ink", &over_limit);
        let expected_head: String = "b".repeat(MAX_TRANSCRIPT_CHARS);
        assert!(prompt
            .as_str()
            .contains(&format!("{}...", expected_head)));
    }

    #[test]
    fn test_prompt_truncation_respects_char_boundaries() {
        // 多字节字符不会被从中间切断
        let long: String = "雨".repeat(MAX_TRANSCRIPT_CHARS + 50);
        let prompt = IllustrationPrompt::compose("ink", &long);
        assert!(prompt.as_str().contains("..."));
    }

    #[test]
    fn test_prompt_compose_deterministic() {
        let a = IllustrationPrompt::compose("sketch", "same input");
        let b = IllustrationPrompt::compose("sketch", "same input");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }
}
