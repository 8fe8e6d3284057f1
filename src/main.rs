//! Fresco - 有声书插图生成服务
//!
//! - Domain: illustration/（时间戳与 Prompt 的纯值计算）
//! - Application: commands, queries, ports
//! - Infrastructure: http, adapters, persistence

use std::sync::Arc;
use std::time::Duration;

use fresco::config::{load_config, print_config};
use fresco::infrastructure::adapters::{
    FfmpegExtractorConfig, FfmpegSegmentExtractor, FileMediaStorage, HttpImageGenClient,
    HttpImageGenClientConfig, WhisperHttpClient, WhisperHttpClientConfig,
};
use fresco::infrastructure::http::{AppState, HttpServer, ServerConfig, UploadPolicy};
use fresco::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteAudiobookRepository,
    SqliteGeneratedImageRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},fresco={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Fresco - 有声书插图生成服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let audiobook_repo = Arc::new(SqliteAudiobookRepository::new(pool.clone()));
    let image_repo = Arc::new(SqliteGeneratedImageRepository::new(pool));

    // 创建媒体文件存储（目录不存在时创建）
    let media_storage = Arc::new(
        FileMediaStorage::new(&config.storage.audio_dir, &config.storage.images_dir).await?,
    );

    // 创建 FFmpeg 片段截取器
    let segment_extractor = Arc::new(FfmpegSegmentExtractor::new(FfmpegExtractorConfig {
        ffmpeg_bin: config.extractor.ffmpeg_bin.clone(),
        ffprobe_bin: config.extractor.ffprobe_bin.clone(),
        min_timeout_secs: config.extractor.min_timeout_secs,
    }));

    // 创建语音转写客户端（凭证缺失时所有请求走回退文案）
    let transcription_engine = Arc::new(WhisperHttpClient::new(WhisperHttpClientConfig {
        api_base: config.transcription.api_base.clone(),
        api_key: config.transcription.api_key.clone(),
        model: config.transcription.model.clone(),
        timeout_secs: config.transcription.timeout_secs,
    })?);

    // 创建图像生成客户端
    let image_generator = Arc::new(
        HttpImageGenClient::new(HttpImageGenClientConfig {
            api_base: config.imagegen.api_base.clone(),
            api_token: config.imagegen.api_token.clone(),
            model_version: config.imagegen.model_version.clone(),
            poll_interval: Duration::from_millis(config.imagegen.poll_interval_ms),
            max_poll_attempts: config.imagegen.max_poll_attempts,
            request_timeout_secs: config.imagegen.request_timeout_secs,
        })
        .map_err(|e| anyhow::anyhow!("Failed to build image generation client: {}", e))?,
    );

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(
        &config.server.host,
        config.server.port,
        config.storage.max_upload_size as usize,
    );
    let upload_policy = UploadPolicy {
        max_upload_size: config.storage.max_upload_size,
        allowed_audio_types: config.storage.allowed_audio_types.clone(),
    };

    let state = AppState::new(
        audiobook_repo,
        image_repo,
        media_storage,
        segment_extractor,
        transcription_engine,
        image_generator,
        upload_policy,
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
