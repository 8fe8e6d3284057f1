//! Illustration Pipeline Handler
//!
//! 单次请求按序驱动四个阶段：截取 → 转写（或回退）→ Prompt 组装 → 生成。
//! 任一阶段的终态错误立刻短路后续阶段，并以阶段打标的形式上抛。
//! 相同 (audiobook, timestamp) 的并发请求不会互相排斥：各自完整执行、
//! 各自产生一条记录（不去重，见 DESIGN.md）。

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::GenerateIllustration;
use crate::application::error::{ApplicationError, PipelineStage};
use crate::application::ports::{
    AudiobookRepositoryPort, GeneratedImageRecord, GeneratedImageRepositoryPort,
    ImageGeneratorPort, MediaStoragePort, SegmentExtractorPort, TranscriptionEnginePort,
};
use crate::domain::{IllustrationPrompt, PlaybackTimestamp};

/// GenerateIllustration Handler - 插图生成管线
///
/// 所有依赖显式注入，handler 本身无可变状态
pub struct GenerateIllustrationHandler {
    audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
    image_repo: Arc<dyn GeneratedImageRepositoryPort>,
    media_storage: Arc<dyn MediaStoragePort>,
    segment_extractor: Arc<dyn SegmentExtractorPort>,
    transcription_engine: Arc<dyn TranscriptionEnginePort>,
    image_generator: Arc<dyn ImageGeneratorPort>,
}

impl GenerateIllustrationHandler {
    pub fn new(
        audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
        image_repo: Arc<dyn GeneratedImageRepositoryPort>,
        media_storage: Arc<dyn MediaStoragePort>,
        segment_extractor: Arc<dyn SegmentExtractorPort>,
        transcription_engine: Arc<dyn TranscriptionEnginePort>,
        image_generator: Arc<dyn ImageGeneratorPort>,
    ) -> Self {
        Self {
            audiobook_repo,
            image_repo,
            media_storage,
            segment_extractor,
            transcription_engine,
            image_generator,
        }
    }

    pub async fn handle(
        &self,
        command: GenerateIllustration,
    ) -> Result<GeneratedImageRecord, ApplicationError> {
        let timestamp = PlaybackTimestamp::new(command.timestamp)?;

        let audiobook = self
            .audiobook_repo
            .find_by_id(command.audiobook_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Audiobook", command.audiobook_id))?;

        let source = self.media_storage.audio_path(&audiobook.stored_filename);
        let window = timestamp.extraction_window();

        tracing::info!(
            audiobook_id = %audiobook.id,
            timestamp = command.timestamp,
            window_start = window.start_secs,
            window_duration = window.duration_secs,
            "Illustration pipeline started"
        );

        // 阶段 1: 截取回放位置之前的音频窗口
        let segment = self
            .segment_extractor
            .extract(&source, window.start_secs, window.duration_secs)
            .await?;

        // 阶段 2: 转写。软失败，不可用时改用回退文案
        let transcription = match self.transcription_engine.transcribe(&segment).await {
            Some(text) => text,
            None => {
                tracing::warn!(
                    audiobook_id = %audiobook.id,
                    stage = %PipelineStage::Transcription,
                    "Transcription unavailable, using fallback transcript"
                );
                timestamp.fallback_transcript()
            }
        };

        // 阶段 3: Prompt 组装（纯函数）
        let prompt = IllustrationPrompt::compose(&audiobook.style_prompt, &transcription);

        // 阶段 4: 提交生成任务并下载结果
        let image_bytes = self.image_generator.generate(prompt.as_str()).await?;

        // 图片先落盘、记录后写库：任何阶段失败都不会留下被记录引用的半成品
        let image_filename = format!(
            "{}_{}_{}.png",
            audiobook.id,
            timestamp.as_secs(),
            filename_suffix()
        );
        self.media_storage
            .save_image(&image_filename, &image_bytes)
            .await?;

        let record = GeneratedImageRecord {
            id: Uuid::new_v4(),
            audiobook_id: audiobook.id,
            timestamp_secs: timestamp.as_secs(),
            transcription,
            image_prompt: prompt.into_string(),
            image_filename,
            created_at: Utc::now(),
        };
        self.image_repo.save(&record).await?;

        tracing::info!(
            audiobook_id = %audiobook.id,
            image_id = %record.id,
            filename = %record.image_filename,
            image_size = image_bytes.len(),
            "Illustration pipeline completed"
        );

        Ok(record)
    }
}

/// 文件名去重后缀（8 位十六进制）
fn filename_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudiobookRecord;
    use crate::infrastructure::adapters::{
        FakeImageGenClient, FakeSegmentExtractor, FakeTranscriptionClient, FileMediaStorage,
    };
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteAudiobookRepository,
        SqliteGeneratedImageRepository,
    };

    struct PipelineEnv {
        handler: GenerateIllustrationHandler,
        audiobook_repo: Arc<SqliteAudiobookRepository>,
        image_repo: Arc<SqliteGeneratedImageRepository>,
        media_storage: Arc<FileMediaStorage>,
        extractor: Arc<FakeSegmentExtractor>,
        temp: tempfile::TempDir,
    }

    async fn pipeline_env(
        extractor: FakeSegmentExtractor,
        transcript: Option<&str>,
        generator: FakeImageGenClient,
    ) -> PipelineEnv {
        let temp = tempfile::tempdir().unwrap();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let audiobook_repo = Arc::new(SqliteAudiobookRepository::new(pool.clone()));
        let image_repo = Arc::new(SqliteGeneratedImageRepository::new(pool));
        let media_storage = Arc::new(
            FileMediaStorage::new(temp.path().join("audio"), temp.path().join("images"))
                .await
                .unwrap(),
        );
        let extractor = Arc::new(extractor);

        let handler = GenerateIllustrationHandler::new(
            audiobook_repo.clone(),
            image_repo.clone(),
            media_storage.clone(),
            extractor.clone(),
            Arc::new(FakeTranscriptionClient::new(transcript.map(str::to_string))),
            Arc::new(generator),
        );

        PipelineEnv {
            handler,
            audiobook_repo,
            image_repo,
            media_storage,
            extractor,
            temp,
        }
    }

    async fn seed_audiobook(env: &PipelineEnv) -> AudiobookRecord {
        let record = AudiobookRecord {
            id: Uuid::new_v4(),
            original_name: "book.mp3".to_string(),
            stored_filename: "stored-book.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            style_prompt: "watercolor".to_string(),
            duration_secs: Some(300),
            created_at: Utc::now(),
        };
        env.audiobook_repo.save(&record).await.unwrap();
        env.media_storage
            .save_audio(&record.stored_filename, b"fake audio bytes")
            .await
            .unwrap();
        record
    }

    fn image_files(env: &PipelineEnv) -> usize {
        std::fs::read_dir(env.temp.path().join("images"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_pipeline_success_persists_record_and_file() {
        let env = pipeline_env(
            FakeSegmentExtractor::new(),
            Some("a stormy night at sea"),
            FakeImageGenClient::succeeding(b"png-bytes".to_vec()),
        )
        .await;
        let book = seed_audiobook(&env).await;

        let record = env
            .handler
            .handle(GenerateIllustration {
                audiobook_id: book.id,
                timestamp: 90.0,
            })
            .await
            .unwrap();

        assert_eq!(record.timestamp_secs, 90);
        assert_eq!(record.transcription, "a stormy night at sea");
        assert!(record
            .image_prompt
            .starts_with("watercolor, a stormy night at sea"));

        // 截取窗口结束于请求时间戳
        assert_eq!(env.extractor.calls(), vec![(60.0, 30.0)]);

        // 文件与记录都已落地
        assert!(env.media_storage.image_path(&record.image_filename).exists());
        let stored = env.image_repo.find_by_audiobook(book.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].image_filename, record.image_filename);
    }

    #[tokio::test]
    async fn test_pipeline_window_clamped_at_file_start() {
        let env = pipeline_env(
            FakeSegmentExtractor::new(),
            Some("text"),
            FakeImageGenClient::succeeding(vec![1, 2, 3]),
        )
        .await;
        let book = seed_audiobook(&env).await;

        env.handler
            .handle(GenerateIllustration {
                audiobook_id: book.id,
                timestamp: 10.0,
            })
            .await
            .unwrap();

        assert_eq!(env.extractor.calls(), vec![(0.0, 30.0)]);
    }

    #[tokio::test]
    async fn test_pipeline_uses_fallback_when_transcription_unavailable() {
        let env = pipeline_env(
            FakeSegmentExtractor::new(),
            None,
            FakeImageGenClient::succeeding(vec![0xAA]),
        )
        .await;
        let book = seed_audiobook(&env).await;

        let record = env
            .handler
            .handle(GenerateIllustration {
                audiobook_id: book.id,
                timestamp: 125.0,
            })
            .await
            .unwrap();

        assert_eq!(
            record.transcription,
            "Audio content at 02:05 - transcription unavailable"
        );
        assert!(record.image_prompt.contains("02:05"));
    }

    #[tokio::test]
    async fn test_generation_failure_persists_nothing() {
        let env = pipeline_env(
            FakeSegmentExtractor::new(),
            Some("text"),
            FakeImageGenClient::failing(),
        )
        .await;
        let book = seed_audiobook(&env).await;

        let err = env
            .handler
            .handle(GenerateIllustration {
                audiobook_id: book.id,
                timestamp: 42.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Pipeline {
                stage: PipelineStage::Generation,
                ..
            }
        ));
        assert!(env
            .image_repo
            .find_by_audiobook(book.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(image_files(&env), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_short_circuits() {
        let env = pipeline_env(
            FakeSegmentExtractor::failing(),
            Some("text"),
            FakeImageGenClient::succeeding(vec![1]),
        )
        .await;
        let book = seed_audiobook(&env).await;

        let err = env
            .handler
            .handle(GenerateIllustration {
                audiobook_id: book.id,
                timestamp: 42.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Pipeline {
                stage: PipelineStage::Extraction,
                ..
            }
        ));
        assert!(env
            .image_repo
            .find_by_audiobook(book.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_invalid_timestamp_rejected() {
        let env = pipeline_env(
            FakeSegmentExtractor::new(),
            Some("text"),
            FakeImageGenClient::succeeding(vec![1]),
        )
        .await;
        let book = seed_audiobook(&env).await;

        let err = env
            .handler
            .handle(GenerateIllustration {
                audiobook_id: book.id,
                timestamp: -3.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert!(env.extractor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_audiobook_not_found() {
        let env = pipeline_env(
            FakeSegmentExtractor::new(),
            Some("text"),
            FakeImageGenClient::succeeding(vec![1]),
        )
        .await;

        let err = env
            .handler
            .handle(GenerateIllustration {
                audiobook_id: Uuid::new_v4(),
                timestamp: 5.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
