//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 音频截取配置
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// 语音转写配置
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// 图像生成配置
    #[serde(default)]
    pub imagegen: ImageGenConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 上传音频目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// 生成图片目录
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// 上传文件最大大小（字节）
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// 允许上传的音频 MIME 类型
    #[serde(default = "default_allowed_audio_types")]
    pub allowed_audio_types: Vec<String>,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("data/images")
}

fn default_max_upload_size() -> u64 {
    200 * 1024 * 1024 // 200 MB，长篇音频
}

fn default_allowed_audio_types() -> Vec<String> {
    [
        "audio/mpeg",
        "audio/wav",
        "audio/x-wav",
        "audio/mp4",
        "audio/ogg",
        "audio/flac",
        "audio/aac",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            images_dir: default_images_dir(),
            max_upload_size: default_max_upload_size(),
            allowed_audio_types: default_allowed_audio_types(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/fresco.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 音频截取配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// ffmpeg 可执行文件
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,

    /// ffprobe 可执行文件
    #[serde(default = "default_ffprobe_bin")]
    pub ffprobe_bin: String,

    /// 子进程超时下限（秒）
    #[serde(default = "default_min_timeout_secs")]
    pub min_timeout_secs: u64,
}

fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_bin() -> String {
    "ffprobe".to_string()
}

fn default_min_timeout_secs() -> u64 {
    10
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: default_ffmpeg_bin(),
            ffprobe_bin: default_ffprobe_bin(),
            min_timeout_secs: default_min_timeout_secs(),
        }
    }
}

/// 语音转写配置
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    /// 转写服务基础 URL
    #[serde(default = "default_transcription_api_base")]
    pub api_base: String,

    /// API Key；未配置时转写直接走回退文案
    #[serde(default)]
    pub api_key: Option<String>,

    /// 转写模型
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_transcription_timeout")]
    pub timeout_secs: u64,
}

fn default_transcription_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_transcription_timeout() -> u64 {
    30
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_base: default_transcription_api_base(),
            api_key: None,
            model: default_transcription_model(),
            timeout_secs: default_transcription_timeout(),
        }
    }
}

/// 图像生成配置
#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenConfig {
    /// 生成服务基础 URL
    #[serde(default = "default_imagegen_api_base")]
    pub api_base: String,

    /// API Token
    #[serde(default)]
    pub api_token: String,

    /// 生成模型版本标识
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// 轮询次数上限
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// 单次 HTTP 请求超时（秒）
    #[serde(default = "default_imagegen_timeout")]
    pub request_timeout_secs: u64,
}

fn default_imagegen_api_base() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_model_version() -> String {
    "39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_max_poll_attempts() -> u32 {
    60
}

fn default_imagegen_timeout() -> u64 {
    30
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            api_base: default_imagegen_api_base(),
            api_token: String::new(),
            model_version: default_model_version(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            request_timeout_secs: default_imagegen_timeout(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
