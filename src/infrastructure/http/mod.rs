//! HTTP Layer - RESTful API
//!
//! 含字节区间感知的音频流式端点（range.rs）与插图生成端点

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod range;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use range::{parse_range_header, ByteRange, RangeError};
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::{AppState, UploadPolicy};
