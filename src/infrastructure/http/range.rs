//! HTTP Range - Range 头解析与字节区间流式响应
//!
//! 回放端通过 `Range: bytes=<start>-[<end>]` 做拖动定位。解析是尽力而为
//! 的优化：头缺失、单位不对、解析不出数字一律按"未请求 Range"处理，
//! 只有 start 超出资源长度才返回 416。
//!
//! 流式响应按固定块大小懒读文件，文件句柄归响应流所有：客户端提前断开
//! 或中途出错时随流一起 Drop，不泄漏描述符，也不再写出任何字节。

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::io::SeekFrom;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::error::ApiError;

/// 流式读取的块大小
const CHUNK_SIZE: usize = 8 * 1024;

/// 字节区间，两端都含
///
/// 不变量: `0 <= start <= end <= total_len - 1`，只在单个请求内存活
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// 区间字节数，即响应的 Content-Length
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Content-Range 响应头的值
    pub fn content_range(&self, total_len: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_len)
    }
}

/// Range 解析错误
#[derive(Debug, PartialEq, Eq)]
pub enum RangeError {
    /// start 已超出资源末尾，携带总长用于 `Content-Range: bytes */{len}`
    Unsatisfiable { total_len: u64 },
}

/// 解析 `Range` 请求头
///
/// 文法 `bytes=<start>-[<end>]`，`<end>` 缺省表示到资源末尾。
/// 返回值:
/// - `Ok(None)` - 未请求 Range（头缺失或无法解析），调用方应整文件响应
/// - `Ok(Some(range))` - 合法区间，end 已夹取到 `total_len - 1`
/// - `Err(Unsatisfiable)` - start 超出资源长度，应响应 416
pub fn parse_range_header(
    header: Option<&str>,
    total_len: u64,
) -> Result<Option<ByteRange>, RangeError> {
    let Some(raw) = header else {
        return Ok(None);
    };

    let Some(spec) = raw.trim().strip_prefix("bytes=") else {
        return Ok(None);
    };

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return Ok(None);
    };

    let Ok(start) = start_str.trim().parse::<u64>() else {
        return Ok(None);
    };

    if start >= total_len {
        return Err(RangeError::Unsatisfiable { total_len });
    }

    let end = match end_str.trim() {
        "" => total_len - 1,
        s => match s.parse::<u64>() {
            // end 越界时夹取而不是报错
            Ok(v) => v.min(total_len - 1),
            Err(_) => return Ok(None),
        },
    };

    // 文法上 start <= end 恒成立；倒置区间按未请求 Range 处理
    if end < start {
        return Ok(None);
    }

    Ok(Some(ByteRange { start, end }))
}

/// 构建字节区间感知的文件流式响应
///
/// - 无 Range → 200，整文件按块输出
/// - 合法 Range → 206，seek 到 start 后精确输出 `end - start + 1` 字节
/// - start 越界 → 416
///
/// 所有路径都带 `Accept-Ranges: bytes`。
pub async fn range_response(
    path: &Path,
    content_type: &str,
    range_header: Option<&str>,
) -> Result<Response, ApiError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open audio file: {}", e)))?;

    let total_len = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read file metadata: {}", e)))?
        .len();

    let range = parse_range_header(range_header, total_len)
        .map_err(|RangeError::Unsatisfiable { total_len }| ApiError::RangeNotSatisfiable {
            total_len,
        })?;

    let response = match range {
        Some(range) => {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(|e| ApiError::Internal(format!("Failed to seek audio file: {}", e)))?;

            // take 限制读取上限，流结束时字节数与 Content-Length 严格一致
            let limited = file.take(range.content_length());
            let stream = ReaderStream::with_capacity(limited, CHUNK_SIZE);

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, range.content_length())
                .header(header::CONTENT_RANGE, range.content_range(total_len))
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
        }
        None => {
            let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, total_len)
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
        }
    };

    response.map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
