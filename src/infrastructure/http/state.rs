//! Application State
//!
//! 持有所有端口与 Command/Query Handler 实例。每个服务都在这里
//! 显式注入构造，进程内没有任何模块级单例。

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateAudiobookHandler,
    DeleteAudiobookHandler,
    GenerateIllustrationHandler,
    // Query handlers
    GetAudiobookHandler,
    GetGeneratedImageHandler,
    ListAudiobooksHandler,
    // Ports
    AudiobookRepositoryPort,
    GeneratedImageRepositoryPort,
    ImageGeneratorPort,
    MediaStoragePort,
    SegmentExtractorPort,
    TranscriptionEnginePort,
};

/// 上传校验策略（大小上限 + MIME 白名单），值来自配置层
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// 单个上传文件的最大字节数
    pub max_upload_size: u64,
    /// 允许的音频 MIME 类型
    pub allowed_audio_types: Vec<String>,
}

impl UploadPolicy {
    pub fn is_allowed(&self, content_type: &str) -> bool {
        self.allowed_audio_types
            .iter()
            .any(|allowed| allowed == content_type)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_upload_size: 200 * 1024 * 1024,
            allowed_audio_types: vec![
                "audio/mpeg".to_string(),
                "audio/wav".to_string(),
                "audio/x-wav".to_string(),
                "audio/mp4".to_string(),
                "audio/ogg".to_string(),
                "audio/flac".to_string(),
                "audio/aac".to_string(),
            ],
        }
    }
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
    pub image_repo: Arc<dyn GeneratedImageRepositoryPort>,
    pub media_storage: Arc<dyn MediaStoragePort>,
    pub segment_extractor: Arc<dyn SegmentExtractorPort>,
    pub transcription_engine: Arc<dyn TranscriptionEnginePort>,
    pub image_generator: Arc<dyn ImageGeneratorPort>,
    pub upload_policy: UploadPolicy,

    // ========== Command Handlers ==========
    pub create_audiobook_handler: CreateAudiobookHandler,
    pub delete_audiobook_handler: DeleteAudiobookHandler,
    pub generate_illustration_handler: GenerateIllustrationHandler,

    // ========== Query Handlers ==========
    pub get_audiobook_handler: GetAudiobookHandler,
    pub list_audiobooks_handler: ListAudiobooksHandler,
    pub get_generated_image_handler: GetGeneratedImageHandler,
}

impl AppState {
    /// 创建应用状态
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        audiobook_repo: Arc<dyn AudiobookRepositoryPort>,
        image_repo: Arc<dyn GeneratedImageRepositoryPort>,
        media_storage: Arc<dyn MediaStoragePort>,
        segment_extractor: Arc<dyn SegmentExtractorPort>,
        transcription_engine: Arc<dyn TranscriptionEnginePort>,
        image_generator: Arc<dyn ImageGeneratorPort>,
        upload_policy: UploadPolicy,
    ) -> Self {
        Self {
            // Ports
            audiobook_repo: audiobook_repo.clone(),
            image_repo: image_repo.clone(),
            media_storage: media_storage.clone(),
            segment_extractor: segment_extractor.clone(),
            transcription_engine: transcription_engine.clone(),
            image_generator: image_generator.clone(),
            upload_policy,

            // Command handlers
            create_audiobook_handler: CreateAudiobookHandler::new(audiobook_repo.clone()),
            delete_audiobook_handler: DeleteAudiobookHandler::new(
                audiobook_repo.clone(),
                image_repo.clone(),
                media_storage.clone(),
            ),
            generate_illustration_handler: GenerateIllustrationHandler::new(
                audiobook_repo.clone(),
                image_repo.clone(),
                media_storage.clone(),
                segment_extractor,
                transcription_engine,
                image_generator,
            ),

            // Query handlers
            get_audiobook_handler: GetAudiobookHandler::new(
                audiobook_repo.clone(),
                image_repo.clone(),
            ),
            list_audiobooks_handler: ListAudiobooksHandler::new(audiobook_repo),
            get_generated_image_handler: GetGeneratedImageHandler::new(image_repo, media_storage),
        }
    }
}
