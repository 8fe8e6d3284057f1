//! Transcription Adapters

mod fake_transcription_client;
mod whisper_http_client;

pub use fake_transcription_client::FakeTranscriptionClient;
pub use whisper_http_client::{WhisperHttpClient, WhisperHttpClientConfig};
