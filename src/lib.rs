//! Fresco - 有声书插图生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Illustration Context: 播放时间戳、截取窗口、Prompt 组装（纯值计算）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, MediaStorage, SegmentExtractor,
//!   TranscriptionEngine, ImageGenerator）
//! - Commands: CQRS 命令处理器（上传落库、删除、插图生成管线）
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API，字节区间感知的音频流式端点
//! - Adapters: FFmpeg 截取、Whisper 转写、异步图像生成客户端、文件存储
//! - Persistence: SQLite 存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
