//! 端到端集成测试
//!
//! 用进程内的 axum 桩服务模拟 centrala 和 LLM 两个协作方，
//! 驱动真实路由表跑完整条管道。
//! 需要真实外部服务的用例默认忽略，手动运行：cargo test -- --ignored

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use centrala_tasks::app::{App, AppState};
use centrala_tasks::config::Config;
use centrala_tasks::utils::logging::truncate_text;

/// 校准文档夹具：第一条加法算错了，第二条带一个开放问题
const CALIBRATION_FIXTURE: &str = r#"{
    "apikey": "%PLACEHOLDER%",
    "description": "Dane kalibracyjne",
    "copyright": "C2024",
    "test-data": [
        {"question": "2+2", "answer": 5},
        {"question": "10+3", "answer": 13, "test": {"q": "Jaka jest stolica Polski?", "a": "???"}}
    ]
}"#;

const CENZURA_FIXTURE: &str =
    "Dane osoby: Jan Nowak. Mieszka w Krakowie przy ul. Polnej 5. Ma 40 lat.";

/// 在随机端口上拉起一个路由表，返回基础地址
async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("绑定测试端口应该成功");
    let addr = listener.local_addr().expect("读取端口应该成功");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("桩服务运行失败");
    });
    format!("http://{}", addr)
}

/// centrala 桩服务：数据源资源 + 上报接口，收到的上报内容全部记录下来
fn stub_centrala_router(reports: Arc<Mutex<Vec<Value>>>) -> Router {
    Router::new()
        .route(
            "/data/{key}/json.txt",
            get(|| async { CALIBRATION_FIXTURE }),
        )
        .route(
            "/data/{key}/cenzura.txt",
            get(|| async { CENZURA_FIXTURE }),
        )
        .route(
            "/report",
            post(move |Json(body): Json<Value>| {
                let reports = reports.clone();
                async move {
                    reports.lock().await.push(body);
                    Json(json!({"code": 0, "message": "OK"}))
                }
            }),
        )
}

/// centrala 桩服务的故障版：上报接口总是 500
fn broken_centrala_router() -> Router {
    Router::new()
        .route(
            "/data/{key}/cenzura.txt",
            get(|| async { CENZURA_FIXTURE }),
        )
        .route(
            "/report",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "awaria").into_response() }),
        )
}

/// 兼容 OpenAI 聊天接口的 LLM 桩服务，按提示词内容挑选回复
fn stub_llm_router() -> Router {
    Router::new().route(
        "/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let prompt = body["messages"]
                .as_array()
                .and_then(|m| m.last())
                .and_then(|m| m["content"].as_str())
                .unwrap_or_default()
                .to_string();

            // 脱敏提示词 → 连写两个标记的"不听话"输出，其余 → 固定答案
            let content = if prompt.contains("Text to censor") {
                "Osoba CENZURA CENZURA. Mieszka w CENZURA przy ul. CENZURA CENZURA. Ma CENZURA lat."
            } else {
                "Kraków"
            };

            Json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
            }))
        }),
    )
}

fn test_config(centrala_base: &str, llm_base: &str) -> Config {
    Config {
        centrala_url: centrala_base.to_string(),
        aidevs_api_key: "klucz-testowy".to_string(),
        openai_api_key: "sk-test".to_string(),
        openai_api_base: llm_base.to_string(),
        groq_api_key: "gsk-test".to_string(),
        http_timeout_secs: 5,
        ..Config::default()
    }
}

/// 拉起被测服务，返回它的基础地址
async fn spawn_app(config: Config) -> String {
    let state = Arc::new(AppState::new(config).expect("构造应用状态应该成功"));
    spawn_router(App::router(state)).await
}

#[tokio::test]
async fn test_calibration_pipeline_corrects_answers_and_reports() {
    let reports: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let centrala_base = spawn_router(stub_centrala_router(reports.clone())).await;
    let llm_base = spawn_router(stub_llm_router()).await;
    let app_base = spawn_app(test_config(&centrala_base, &llm_base)).await;

    let response = reqwest::get(format!("{}/s01/e03", app_base))
        .await
        .expect("请求应该成功");
    assert_eq!(response.status(), 200);

    // 评分应答原样透传
    let body: Value = response.json().await.expect("响应体应该是 JSON");
    assert_eq!(body, json!({"code": 0, "message": "OK"}));

    // 检查上报的内容
    let reports = reports.lock().await;
    assert_eq!(reports.len(), 1, "应该恰好上报一次");
    let payload = &reports[0];
    assert_eq!(payload["task"], "JSON");
    assert_eq!(payload["apikey"], "klucz-testowy");

    let answer = &payload["answer"];
    // 凭证写回文档
    assert_eq!(answer["apikey"], "klucz-testowy");
    // 2+2 的错误答案 5 被修正成 4
    assert_eq!(answer["test-data"][0]["answer"], 4);
    // 正确答案不动
    assert_eq!(answer["test-data"][1]["answer"], 13);
    // 开放问题由 LLM 填上
    assert_eq!(answer["test-data"][1]["test"]["a"], "Kraków");
}

#[tokio::test]
async fn test_censor_pipeline_collapses_duplicate_markers() {
    let reports: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let centrala_base = spawn_router(stub_centrala_router(reports.clone())).await;
    let llm_base = spawn_router(stub_llm_router()).await;
    let app_base = spawn_app(test_config(&centrala_base, &llm_base)).await;

    let response = reqwest::get(format!("{}/s01/e05", app_base))
        .await
        .expect("请求应该成功");
    assert_eq!(response.status(), 200);

    let reports = reports.lock().await;
    assert_eq!(reports.len(), 1, "应该恰好上报一次");
    let payload = &reports[0];
    assert_eq!(payload["task"], "CENZURA");

    let answer = payload["answer"].as_str().expect("答案应该是字符串");
    // 连写的标记被折叠，每个敏感片段只剩一个
    assert_eq!(
        answer,
        "Osoba CENZURA. Mieszka w CENZURA przy ul. CENZURA. Ma CENZURA lat."
    );
    assert!(!answer.contains("CENZURA CENZURA"));
}

#[tokio::test]
async fn test_report_failure_becomes_structured_500() {
    let centrala_base = spawn_router(broken_centrala_router()).await;
    let llm_base = spawn_router(stub_llm_router()).await;
    let app_base = spawn_app(test_config(&centrala_base, &llm_base)).await;

    let response = reqwest::get(format!("{}/s01/e05", app_base))
        .await
        .expect("请求应该成功");
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.expect("响应体应该是 JSON");
    assert_eq!(body["status"], "❌ Error");
    let message = body["message"].as_str().expect("消息应该是字符串");
    assert!(!message.is_empty());
    // 步骤名和内部结构不出现在响应体里
    assert!(body.get("step").is_none());
}

#[tokio::test]
async fn test_unknown_path_gets_structured_404() {
    let reports: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let centrala_base = spawn_router(stub_centrala_router(reports)).await;
    let llm_base = spawn_router(stub_llm_router()).await;
    let app_base = spawn_app(test_config(&centrala_base, &llm_base)).await;

    let response = reqwest::get(format!("{}/s03/e99", app_base))
        .await
        .expect("请求应该成功");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("响应体应该是 JSON");
    assert_eq!(body["status"], "❌ Not Found");
}

#[tokio::test]
async fn test_index_banner() {
    let reports: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let centrala_base = spawn_router(stub_centrala_router(reports)).await;
    let llm_base = spawn_router(stub_llm_router()).await;
    let app_base = spawn_app(test_config(&centrala_base, &llm_base)).await;

    let response = reqwest::get(format!("{}/", app_base))
        .await
        .expect("请求应该成功");
    assert_eq!(response.status(), 200);
    assert!(response
        .text()
        .await
        .expect("读取响应体应该成功")
        .contains("running"));
}

/// 真实环境冒烟测试，需要完整的环境变量和可用的外部服务
#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_censor_against_real_services() {
    let config = Config::from_env().expect("加载配置应该成功");
    let app_base = spawn_app(config).await;

    let response = reqwest::get(format!("{}/s01/e05", app_base))
        .await
        .expect("请求应该成功");

    let status = response.status();
    let body = response.text().await.expect("读取响应体应该成功");
    println!("status={}, body={}", status, truncate_text(&body, 300));
    assert!(status.is_success(), "真实流程应该成功");
}
