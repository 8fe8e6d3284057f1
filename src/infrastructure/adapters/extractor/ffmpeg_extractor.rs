//! FFmpeg Segment Extractor - 调用外部 ffmpeg 截取音频片段
//!
//! 实现 SegmentExtractorPort trait：
//! - extract: `ffmpeg -i <src> -ss <start> -t <dur> -ar 16000 -ac 1 -f wav`
//!   输出统一为 16kHz 单声道 WAV，符合语音识别的输入要求
//! - probe_duration: `ffprobe -print_format json -show_format`
//!
//! 临时输出文件用 tempfile::TempPath 持有，任何退出路径（成功、错误、
//! 取消）都会在 Drop 时删除。子进程执行时间有上界，超时即杀掉。

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::process::Command;

use crate::application::ports::{AudioSegment, ExtractionError, SegmentExtractorPort};

/// 目标采样率（语音识别输入）
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// 目标声道数
const TARGET_CHANNELS: u8 = 1;

/// FFmpeg 提取器配置
#[derive(Debug, Clone)]
pub struct FfmpegExtractorConfig {
    /// ffmpeg 可执行文件
    pub ffmpeg_bin: String,
    /// ffprobe 可执行文件
    pub ffprobe_bin: String,
    /// 子进程超时下限（秒）；实际超时取 max(下限, 2×片段时长)
    pub min_timeout_secs: u64,
}

impl Default for FfmpegExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            min_timeout_secs: 10,
        }
    }
}

/// FFmpeg Segment Extractor
pub struct FfmpegSegmentExtractor {
    config: FfmpegExtractorConfig,
}

impl FfmpegSegmentExtractor {
    pub fn new(config: FfmpegExtractorConfig) -> Self {
        Self { config }
    }

    /// 使用默认配置创建（PATH 中的 ffmpeg/ffprobe）
    pub fn with_defaults() -> Self {
        Self::new(FfmpegExtractorConfig::default())
    }

    fn subprocess_timeout(&self, duration_secs: f64) -> u64 {
        let doubled = (duration_secs * 2.0).ceil() as u64;
        doubled.max(self.config.min_timeout_secs)
    }
}

#[async_trait]
impl SegmentExtractorPort for FfmpegSegmentExtractor {
    async fn extract(
        &self,
        source: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> Result<AudioSegment, ExtractionError> {
        if !source.exists() {
            return Err(ExtractionError::SourceNotFound(
                source.to_string_lossy().to_string(),
            ));
        }

        // TempPath 在 Drop 时删除文件，覆盖所有退出路径
        let tmp = tempfile::Builder::new()
            .prefix("fresco-segment-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| ExtractionError::IoError(e.to_string()))?;
        let tmp_path = tmp.into_temp_path();

        let timeout_secs = self.subprocess_timeout(duration_secs);

        let mut command = Command::new(&self.config.ffmpeg_bin);
        command
            .arg("-i")
            .arg(source)
            .arg("-ss")
            .arg(start_secs.to_string())
            .arg("-t")
            .arg(duration_secs.to_string())
            .args(["-ar", "16000", "-ac", "1", "-f", "wav", "-y"])
            .arg(&tmp_path)
            // 超时或请求取消时连同子进程一起结束
            .kill_on_drop(true);

        let output = tokio::time::timeout(Duration::from_secs(timeout_secs), command.output())
            .await
            .map_err(|_| ExtractionError::Timeout(timeout_secs))?
            .map_err(|e| ExtractionError::SpawnFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ExtractionError::TranscoderFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let data = tokio::fs::read(&tmp_path)
            .await
            .map_err(|e| ExtractionError::IoError(e.to_string()))?;

        if data.is_empty() {
            return Err(ExtractionError::MalformedOutput(
                "transcoder wrote no bytes".to_string(),
            ));
        }

        // 校验容器完整性，损坏的输出绝不当作成功结果返回
        let info = wav_info(&data)?;

        tracing::debug!(
            source = %source.display(),
            start_secs,
            duration_secs = info.duration_secs,
            size = data.len(),
            "Audio segment extracted"
        );

        Ok(AudioSegment {
            data,
            sample_rate: info.sample_rate,
            channels: info.channels,
            duration_secs: info.duration_secs,
        })
    }

    async fn probe_duration(&self, source: &Path) -> Result<f64, ExtractionError> {
        if !source.exists() {
            return Err(ExtractionError::SourceNotFound(
                source.to_string_lossy().to_string(),
            ));
        }

        let output = Command::new(&self.config.ffprobe_bin)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(source)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExtractionError::SpawnFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(ExtractionError::TranscoderFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ExtractionError::MalformedOutput(e.to_string()))?;

        parsed["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| {
                ExtractionError::MalformedOutput("probe output missing duration".to_string())
            })
    }
}

#[derive(Debug)]
struct WavInfo {
    sample_rate: u32,
    channels: u8,
    duration_secs: f64,
}

/// 解析 WAV 容器，返回采样率/声道/时长
///
/// 解析失败说明转码输出损坏，映射为 MalformedOutput
fn wav_info(data: &[u8]) -> Result<WavInfo, ExtractionError> {
    let cursor = std::io::Cursor::new(data.to_vec());
    let stream = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ExtractionError::MalformedOutput(e.to_string()))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| ExtractionError::MalformedOutput("no audio track".to_string()))?;

    let params = &track.codec_params;
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| ExtractionError::MalformedOutput("missing sample rate".to_string()))?;
    let channels = params
        .channels
        .map(|c| c.count() as u8)
        .unwrap_or(TARGET_CHANNELS);
    let duration_secs = params
        .n_frames
        .map(|frames| frames as f64 / sample_rate as f64)
        .unwrap_or(0.0);

    if sample_rate != TARGET_SAMPLE_RATE {
        tracing::warn!(
            sample_rate,
            "Extracted segment sample rate differs from 16kHz target"
        );
    }

    Ok(WavInfo {
        sample_rate,
        channels,
        duration_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造最小可解析的 PCM WAV（16kHz 单声道 16bit）
    fn minimal_wav(num_samples: u32) -> Vec<u8> {
        let data_size = num_samples * 2;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_size).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        // fmt chunk
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&16_000u32.to_le_bytes());
        bytes.extend_from_slice(&(16_000u32 * 2).to_le_bytes()); // byte rate
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        // data chunk
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_size.to_le_bytes());
        bytes.extend(std::iter::repeat(0u8).take(data_size as usize));
        bytes
    }

    #[test]
    fn test_wav_info_parses_minimal_wav() {
        let info = wav_info(&minimal_wav(16_000)).unwrap();
        assert_eq!(info.sample_rate, 16_000);
        assert_eq!(info.channels, 1);
        assert!((info.duration_secs - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_wav_info_rejects_garbage() {
        let err = wav_info(b"definitely not a wav file").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedOutput(_)));
    }

    #[test]
    fn test_subprocess_timeout_floor() {
        let extractor = FfmpegSegmentExtractor::with_defaults();
        // 2×30s 窗口
        assert_eq!(extractor.subprocess_timeout(30.0), 60);
        // 极短窗口也不低于下限
        assert_eq!(extractor.subprocess_timeout(1.0), 10);
    }

    #[tokio::test]
    async fn test_extract_missing_source() {
        let extractor = FfmpegSegmentExtractor::with_defaults();
        let err = extractor
            .extract(Path::new("/nonexistent/audio.mp3"), 0.0, 30.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::SourceNotFound(_)));
    }

    #[tokio::test]
    async fn test_extract_missing_binary_is_spawn_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let extractor = FfmpegSegmentExtractor::new(FfmpegExtractorConfig {
            ffmpeg_bin: "/nonexistent/ffmpeg-binary".to_string(),
            ffprobe_bin: "/nonexistent/ffprobe-binary".to_string(),
            min_timeout_secs: 5,
        });

        let err = extractor
            .extract(temp.path(), 0.0, 30.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::SpawnFailed(_)));
    }

    #[tokio::test]
    async fn test_probe_missing_source() {
        let extractor = FfmpegSegmentExtractor::with_defaults();
        let err = extractor
            .probe_duration(Path::new("/nonexistent/audio.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::SourceNotFound(_)));
    }
}
