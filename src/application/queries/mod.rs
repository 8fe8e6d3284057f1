//! CQRS 查询及处理器

mod audiobook_queries;

pub mod handlers;

pub use audiobook_queries::{GetAudiobook, GetGeneratedImage, ListAudiobooks};
