//! Query Handlers

mod audiobook_handlers;

pub use audiobook_handlers::{
    AudiobookDetail, GetAudiobookHandler, GetGeneratedImageHandler, ListAudiobooksHandler,
};
