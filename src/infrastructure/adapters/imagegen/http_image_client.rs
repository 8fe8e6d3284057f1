//! HTTP Image Generation Client - 异步图像生成任务客户端
//!
//! 实现 ImageGeneratorPort trait，走"提交 → 轮询 → 下载"协议:
//! POST {base}/predictions          提交任务（固定模型参数），返回 {id, status}
//! GET  {base}/predictions/{id}     查询状态: starting/processing/succeeded/failed
//! 成功后 output[0] 为图片下载地址
//!
//! 轮询是系统里唯一的主动等待，必须在次数上限内收敛：未知状态立即
//! 失败（fail closed），瞬时网络错误消耗一次尝试后重试，次数耗尽返回
//! 超时错误。等待用 tokio::time::sleep 实现，请求取消时随任务一起取消。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{GenerationError, ImageGeneratorPort};

// 固定生成参数，本设计不支持按请求调参
const IMAGE_WIDTH: u32 = 1024;
const IMAGE_HEIGHT: u32 = 1024;
const NUM_OUTPUTS: u32 = 1;
const SCHEDULER: &str = "K_EULER";
const NUM_INFERENCE_STEPS: u32 = 20;
const GUIDANCE_SCALE: f64 = 7.5;

/// 任务提交请求体
#[derive(Debug, Serialize)]
struct PredictionRequest {
    version: String,
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    width: u32,
    height: u32,
    num_outputs: u32,
    scheduler: &'static str,
    num_inference_steps: u32,
    guidance_scale: f64,
}

/// 任务状态响应
#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP 图像生成客户端配置
#[derive(Debug, Clone)]
pub struct HttpImageGenClientConfig {
    /// 生成服务基础 URL
    pub api_base: String,
    /// API Token
    pub api_token: String,
    /// 生成模型版本标识
    pub model_version: String,
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 轮询次数上限，到达后返回超时错误
    pub max_poll_attempts: u32,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for HttpImageGenClientConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.replicate.com/v1".to_string(),
            api_token: String::new(),
            model_version: "39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b"
                .to_string(),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 60,
            request_timeout_secs: 30,
        }
    }
}

/// HTTP 图像生成客户端
pub struct HttpImageGenClient {
    client: Client,
    config: HttpImageGenClientConfig,
}

impl HttpImageGenClient {
    /// 创建新的客户端
    pub fn new(config: HttpImageGenClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn predictions_url(&self) -> String {
        format!("{}/predictions", self.config.api_base)
    }

    fn prediction_url(&self, id: &str) -> String {
        format!("{}/predictions/{}", self.config.api_base, id)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.config.api_token)
    }

    /// 提交生成任务
    async fn submit(&self, prompt: &str) -> Result<Prediction, GenerationError> {
        let request = PredictionRequest {
            version: self.config.model_version.clone(),
            input: PredictionInput {
                prompt: prompt.to_string(),
                width: IMAGE_WIDTH,
                height: IMAGE_HEIGHT,
                num_outputs: NUM_OUTPUTS,
                scheduler: SCHEDULER,
                num_inference_steps: NUM_INFERENCE_STEPS,
                guidance_scale: GUIDANCE_SCALE,
            },
        };

        let response = self
            .client
            .post(self.predictions_url())
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::SubmissionRejected(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        response.json::<Prediction>().await.map_err(|e| {
            GenerationError::SubmissionRejected(format!("Invalid submission response: {}", e))
        })
    }

    /// 查询任务状态
    async fn fetch(&self, id: &str) -> Result<Prediction, GenerationError> {
        let response = self
            .client
            .get(self.prediction_url(id))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::NetworkError(format!(
                "Poll returned HTTP {}",
                status
            )));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| GenerationError::NetworkError(format!("Invalid poll response: {}", e)))
    }

    /// 轮询任务直到终态或次数耗尽，成功时返回输出下载地址
    async fn poll(&self, id: &str) -> Result<String, GenerationError> {
        for attempt in 1..=self.config.max_poll_attempts {
            match self.fetch(id).await {
                Ok(prediction) => match prediction.status.as_str() {
                    "succeeded" => {
                        return prediction
                            .output
                            .unwrap_or_default()
                            .into_iter()
                            .next()
                            .ok_or(GenerationError::EmptyOutput);
                    }
                    "failed" => {
                        return Err(GenerationError::JobFailed(
                            prediction
                                .error
                                .unwrap_or_else(|| "unknown error".to_string()),
                        ));
                    }
                    "starting" | "submitted" | "processing" => {
                        tracing::debug!(
                            job_id = %id,
                            attempt,
                            status = %prediction.status,
                            "Generation job still running"
                        );
                    }
                    // 未知状态立即失败，绝不无限等待
                    other => {
                        return Err(GenerationError::UnknownStatus(other.to_string()));
                    }
                },
                // 瞬时轮询失败不终止任务，消耗一次尝试后重试
                Err(e) => {
                    tracing::warn!(
                        job_id = %id,
                        attempt,
                        error = %e,
                        "Poll request failed, will retry"
                    );
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(GenerationError::Timeout {
            attempts: self.config.max_poll_attempts,
        })
    }

    /// 下载生成的图片
    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GenerationError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::DownloadFailed(format!(
                "HTTP {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::DownloadFailed(e.to_string()))?;

        if bytes.is_empty() {
            return Err(GenerationError::DownloadFailed(
                "empty response body".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageGeneratorPort for HttpImageGenClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let prediction = self.submit(prompt).await?;

        tracing::info!(
            job_id = %prediction.id,
            prompt_len = prompt.len(),
            "Generation job submitted"
        );

        // 提交响应可能已带终态（立即失败等），统一交给轮询处理
        let output_url = self.poll(&prediction.id).await?;

        tracing::info!(job_id = %prediction.id, "Generation job succeeded, downloading output");

        let bytes = self.download(&output_url).await?;

        tracing::info!(
            job_id = %prediction.id,
            image_size = bytes.len(),
            "Generated image downloaded"
        );

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::testing::spawn_stub_server;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn client(api_base: &str, max_poll_attempts: u32) -> HttpImageGenClient {
        HttpImageGenClient::new(HttpImageGenClientConfig {
            api_base: api_base.to_string(),
            api_token: "test-token".to_string(),
            model_version: "test-version".to_string(),
            poll_interval: Duration::from_millis(5),
            max_poll_attempts,
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    fn submit_route() -> Router {
        Router::new().route(
            "/predictions",
            post(|| async { Json(json!({"id": "job-1", "status": "starting"})) }),
        )
    }

    #[tokio::test]
    async fn test_successful_generation_downloads_first_output() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let output_url = format!("{}/files/out.png", base);

        let router = submit_route()
            .route(
                "/predictions/:id",
                get({
                    let output_url = output_url.clone();
                    move || {
                        let output_url = output_url.clone();
                        async move {
                            Json(json!({
                                "id": "job-1",
                                "status": "succeeded",
                                "output": [output_url, "ignored-second-output"]
                            }))
                        }
                    }
                }),
            )
            .route("/files/out.png", get(|| async { "png-bytes" }));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = client(&base, 5);
        let bytes = client.generate("a lighthouse at dusk").await.unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_stuck_job_times_out_within_attempt_cap() {
        let polls = Arc::new(AtomicUsize::new(0));
        let router = submit_route().route(
            "/predictions/:id",
            get({
                let polls = polls.clone();
                move || {
                    let polls = polls.clone();
                    async move {
                        polls.fetch_add(1, Ordering::SeqCst);
                        // 永远停在 processing，客户端必须自行收敛
                        Json(json!({"id": "job-1", "status": "processing"}))
                    }
                }
            }),
        );
        let base = spawn_stub_server(router).await;

        let client = client(&base, 3);
        let err = client.generate("prompt").await.unwrap_err();

        assert!(matches!(err, GenerationError::Timeout { attempts: 3 }));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_job_carries_service_reason() {
        let router = submit_route().route(
            "/predictions/:id",
            get(|| async {
                Json(json!({"id": "job-1", "status": "failed", "error": "NSFW content detected"}))
            }),
        );
        let base = spawn_stub_server(router).await;

        let err = client(&base, 5).generate("prompt").await.unwrap_err();
        match err {
            GenerationError::JobFailed(reason) => assert_eq!(reason, "NSFW content detected"),
            other => panic!("expected JobFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_succeeded_with_empty_output_is_error() {
        let router = submit_route().route(
            "/predictions/:id",
            get(|| async { Json(json!({"id": "job-1", "status": "succeeded", "output": []})) }),
        );
        let base = spawn_stub_server(router).await;

        let err = client(&base, 5).generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyOutput));
    }

    #[tokio::test]
    async fn test_unknown_status_fails_closed() {
        let router = submit_route().route(
            "/predictions/:id",
            get(|| async { Json(json!({"id": "job-1", "status": "canceled"})) }),
        );
        let base = spawn_stub_server(router).await;

        let err = client(&base, 5).generate("prompt").await.unwrap_err();
        match err {
            GenerationError::UnknownStatus(status) => assert_eq!(status, "canceled"),
            other => panic!("expected UnknownStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_submission_is_terminal() {
        let router = Router::new().route(
            "/predictions",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid version") }),
        );
        let base = spawn_stub_server(router).await;

        let err = client(&base, 5).generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::SubmissionRejected(_)));
    }

    #[tokio::test]
    async fn test_transient_poll_failures_consume_attempts() {
        let polls = Arc::new(AtomicUsize::new(0));
        let router = submit_route().route(
            "/predictions/:id",
            get({
                let polls = polls.clone();
                move || {
                    let polls = polls.clone();
                    async move {
                        polls.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::INTERNAL_SERVER_ERROR, "flaky")
                    }
                }
            }),
        );
        let base = spawn_stub_server(router).await;

        let err = client(&base, 4).generate("prompt").await.unwrap_err();

        // 每次失败消耗一次尝试，最终超时而不是挂起
        assert!(matches!(err, GenerationError::Timeout { attempts: 4 }));
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_download_is_terminal() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let output_url = format!("{}/files/missing.png", base);

        let router = submit_route().route(
            "/predictions/:id",
            get({
                let output_url = output_url.clone();
                move || {
                    let output_url = output_url.clone();
                    async move {
                        Json(json!({"id": "job-1", "status": "succeeded", "output": [output_url]}))
                    }
                }
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let err = client(&base, 5).generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::DownloadFailed(_)));
    }
}
