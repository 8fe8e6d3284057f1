//! CQRS 命令及处理器

mod audiobook_commands;
mod illustration_commands;

pub mod handlers;

pub use audiobook_commands::{CreateAudiobook, DeleteAudiobook};
pub use illustration_commands::GenerateIllustration;
