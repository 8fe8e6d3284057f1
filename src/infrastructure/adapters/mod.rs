//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod extractor;
pub mod imagegen;
pub mod storage;
pub mod transcription;

pub use extractor::*;
pub use imagegen::*;
pub use storage::*;
pub use transcription::*;
