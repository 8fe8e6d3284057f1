//! Fake Segment Extractor - 测试用，不调用外部转码工具
//!
//! 返回固定的片段字节，并记录每次请求的截取窗口供断言

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use crate::application::ports::{AudioSegment, ExtractionError, SegmentExtractorPort};

/// Fake Segment Extractor
pub struct FakeSegmentExtractor {
    fail: bool,
    /// 记录 (start_secs, duration_secs) 调用序列
    calls: Mutex<Vec<(f64, f64)>>,
}

impl FakeSegmentExtractor {
    /// 始终成功，返回固定片段
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 始终失败（模拟转码器故障）
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 已记录的截取窗口
    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for FakeSegmentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SegmentExtractorPort for FakeSegmentExtractor {
    async fn extract(
        &self,
        _source: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> Result<AudioSegment, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::TranscoderFailed {
                status: 1,
                stderr: "fake transcoder failure".to_string(),
            });
        }

        self.calls.lock().unwrap().push((start_secs, duration_secs));

        Ok(AudioSegment {
            data: vec![0u8; 64],
            sample_rate: 16_000,
            channels: 1,
            duration_secs,
        })
    }

    async fn probe_duration(&self, _source: &Path) -> Result<f64, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::TranscoderFailed {
                status: 1,
                stderr: "fake probe failure".to_string(),
            });
        }
        Ok(300.0)
    }
}
