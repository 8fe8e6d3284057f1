//! Command Handlers

mod audiobook_handlers;
mod illustration_handlers;

pub use audiobook_handlers::{CreateAudiobookHandler, DeleteAudiobookHandler};
pub use illustration_handlers::GenerateIllustrationHandler;
