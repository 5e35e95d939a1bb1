//! 应用入口层
//!
//! 职责：
//! - 启动时构造一次所有协作方客户端，显式注入到各流程（不用全局单例）
//! - 挂载路由表，每个练习一个 GET 端点
//! - 把管道结果统一包装成对外 HTTP 响应

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::clients::{CentralaClient, LlmClient, OcrClient, SpeechClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::pipeline::PipelineOutcome;
use crate::workflow;

/// 进程级共享状态
///
/// 配置只读，客户端长生命周期、无内部可变状态，
/// 各请求之间没有任何共享可写数据
pub struct AppState {
    pub config: Config,
    /// 直接访问机器人站点用的 HTTP 客户端
    pub http: reqwest::Client,
    pub centrala: CentralaClient,
    pub llm: LlmClient,
    pub speech: SpeechClient,
    pub ocr: OcrClient,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed("http client", e))?;

        Ok(Self {
            centrala: CentralaClient::new(http.clone(), &config),
            llm: LlmClient::new(http.clone(), &config),
            speech: SpeechClient::new(http.clone(), &config),
            ocr: OcrClient::new(http.clone(), &config),
            http,
            config,
        })
    }
}

/// 应用主结构
pub struct App {
    state: Arc<AppState>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);
        Ok(Self {
            state: Arc::new(AppState::new(config)?),
        })
    }

    /// 构建路由表
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/s01/e01", get(play_s01e01))
            .route("/s01/e02", get(play_s01e02))
            .route("/s01/e03", get(play_s01e03))
            .route("/s01/e05", get(play_s01e05))
            .route("/s02/e01", get(play_s02e01))
            .route("/s02/e03", get(play_s02e03))
            .route("/s02/e04", get(play_s02e04))
            .fallback(not_found)
            .with_state(state)
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> AppResult<()> {
        let addr = format!("0.0.0.0:{}", self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Other(format!("绑定 {} 失败: {}", addr, e)))?;

        info!("🚀 服务已启动: http://localhost:{}", self.state.config.port);

        axum::serve(listener, Self::router(self.state))
            .await
            .map_err(|e| AppError::Other(e.to_string()))?;

        Ok(())
    }
}

// ========== 路由处理函数 ==========

async fn index() -> &'static str {
    "Centrala task server is running"
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "❌ Not Found",
            "message": "没有这个练习路径"
        })),
    )
        .into_response()
}

async fn play_s01e01(State(state): State<Arc<AppState>>) -> Response {
    respond("s01e01", workflow::captcha_login::run(&state).await)
}

async fn play_s01e02(State(state): State<Arc<AppState>>) -> Response {
    respond("s01e02", workflow::robot_verify::run(&state).await)
}

async fn play_s01e03(State(state): State<Arc<AppState>>) -> Response {
    respond("s01e03", workflow::calibration::run(&state).await)
}

async fn play_s01e05(State(state): State<Arc<AppState>>) -> Response {
    respond("s01e05", workflow::censor::run(&state).await)
}

async fn play_s02e01(State(state): State<Arc<AppState>>) -> Response {
    respond("s02e01", workflow::interrogation::run(&state).await)
}

async fn play_s02e03(State(state): State<Arc<AppState>>) -> Response {
    respond("s02e03", workflow::robot_portrait::run(&state).await)
}

async fn play_s02e04(State(state): State<Arc<AppState>>) -> Response {
    respond("s02e04", workflow::archive_sort::run(&state).await)
}

// ========== 响应包装 ==========

/// 把管道结果转换成对外 HTTP 响应
///
/// 失败时步骤名只进服务端日志，响应体里只有状态标记和归一化后的消息，
/// 不暴露调用栈或内部对象
fn respond<T: Serialize>(label: &str, outcome: PipelineOutcome<T>) -> Response {
    match outcome {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(failure) => {
            error!(
                "[{}] ❌ 处理失败于步骤 {}: {}",
                label, failure.step, failure.message
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "❌ Error",
                    "message": failure.message
                })),
            )
                .into_response()
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 练习管道服务");
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📡 评分接口: {}", config.centrala_url);
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StepFailure;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体应该成功");
        serde_json::from_slice(&bytes).expect("响应体应该是 JSON")
    }

    #[tokio::test]
    async fn test_respond_success_emits_value_with_200() {
        let response = respond("test", Ok(json!({"code": 0, "message": "OK"})));
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body, json!({"code": 0, "message": "OK"}));
    }

    #[tokio::test]
    async fn test_respond_failure_emits_500_without_step_name() {
        let failure = StepFailure {
            step: "获取校准文档".to_string(),
            message: "API请求失败".to_string(),
        };
        let response = respond::<serde_json::Value>("test", Err(failure));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "❌ Error");
        assert_eq!(body["message"], "API请求失败");
        // 步骤名不出现在响应体里
        assert!(!body.to_string().contains("获取校准文档"));
    }

    #[tokio::test]
    async fn test_unmatched_path_gets_structured_404() {
        let response = not_found().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], "❌ Not Found");
    }
}
