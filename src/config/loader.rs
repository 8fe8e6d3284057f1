//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `FRESCO_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `FRESCO_SERVER__PORT=8080`
/// - `FRESCO_TRANSCRIPTION__API_KEY=sk-...`
/// - `FRESCO_IMAGEGEN__API_TOKEN=r8_...`
/// - `FRESCO_DATABASE__PATH=/data/fresco.db`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("storage.audio_dir", "data/audio")?
        .set_default("storage.images_dir", "data/images")?
        .set_default("storage.max_upload_size", 200 * 1024 * 1024)?
        .set_default(
            "storage.allowed_audio_types",
            vec![
                "audio/mpeg",
                "audio/wav",
                "audio/x-wav",
                "audio/mp4",
                "audio/ogg",
                "audio/flac",
                "audio/aac",
            ],
        )?
        .set_default("database.path", "data/fresco.db")?
        .set_default("database.max_connections", 5)?
        .set_default("extractor.ffmpeg_bin", "ffmpeg")?
        .set_default("extractor.ffprobe_bin", "ffprobe")?
        .set_default("extractor.min_timeout_secs", 10)?
        .set_default("transcription.api_base", "https://api.openai.com/v1")?
        .set_default("transcription.model", "whisper-1")?
        .set_default("transcription.timeout_secs", 30)?
        .set_default("imagegen.api_base", "https://api.replicate.com/v1")?
        .set_default("imagegen.api_token", "")?
        .set_default(
            "imagegen.model_version",
            "39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b",
        )?
        .set_default("imagegen.poll_interval_ms", 2000)?
        .set_default("imagegen.max_poll_attempts", 60)?
        .set_default("imagegen.request_timeout_secs", 30)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: FRESCO_，层级分隔符: __ (双下划线)
    // 例如: FRESCO_IMAGEGEN__API_TOKEN=r8_xxx
    builder = builder.add_source(
        Environment::with_prefix("FRESCO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.storage.max_upload_size == 0 {
        return Err(ConfigError::ValidationError(
            "Max upload size cannot be 0".to_string(),
        ));
    }

    if config.storage.allowed_audio_types.is_empty() {
        return Err(ConfigError::ValidationError(
            "Allowed audio types cannot be empty".to_string(),
        ));
    }

    if config.transcription.api_base.is_empty() {
        return Err(ConfigError::ValidationError(
            "Transcription API base cannot be empty".to_string(),
        ));
    }

    if config.imagegen.api_base.is_empty() {
        return Err(ConfigError::ValidationError(
            "Image generation API base cannot be empty".to_string(),
        ));
    }

    // 轮询上限是管线时延有界的前提
    if config.imagegen.max_poll_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "Image generation max poll attempts cannot be 0".to_string(),
        ));
    }

    if config.imagegen.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Image generation poll interval cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志，不输出凭证）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!("Images Directory: {:?}", config.storage.images_dir);
    tracing::info!(
        "Max Upload Size: {} MB",
        config.storage.max_upload_size / 1024 / 1024
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!(
        "Database Max Connections: {}",
        config.database.max_connections
    );
    tracing::info!("FFmpeg: {}", config.extractor.ffmpeg_bin);
    tracing::info!("Transcription API: {}", config.transcription.api_base);
    tracing::info!(
        "Transcription Key Configured: {}",
        config
            .transcription
            .api_key
            .as_ref()
            .is_some_and(|k| !k.is_empty())
    );
    tracing::info!("Image Generation API: {}", config.imagegen.api_base);
    tracing::info!(
        "Image Generation Token Configured: {}",
        !config.imagegen.api_token.is_empty()
    );
    tracing::info!(
        "Generation Polling: every {}ms, up to {} attempts",
        config.imagegen.poll_interval_ms,
        config.imagegen.max_poll_attempts
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
