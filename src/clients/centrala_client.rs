/// 评分接口客户端
///
/// 封装数据源抓取和答案上报两类调用
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{ReportOutcome, ReportPayload};
use crate::utils::logging::truncate_text;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

/// 评分接口客户端
pub struct CentralaClient {
    http: reqwest::Client,
    base_url: String,
    apikey: String,
}

impl CentralaClient {
    /// 创建新的评分接口客户端
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.centrala_url.clone(),
            apikey: config.aidevs_api_key.clone(),
        }
    }

    /// 访问凭证（个别任务要求把它写回上报的文档里）
    pub fn apikey(&self) -> &str {
        &self.apikey
    }

    /// 抓取文本资源
    ///
    /// `GET {base}/data/{apikey}/{resource}`
    pub async fn fetch_text(&self, resource: &str) -> AppResult<String> {
        let url = format!("{}/data/{}/{}", self.base_url, self.apikey, resource);
        debug!("抓取数据: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::api_bad_status(
                &url,
                status.as_u16(),
                truncate_text(&body, 200),
            ));
        }

        Ok(body)
    }

    /// 抓取 JSON 资源并反序列化
    pub async fn fetch_json<T: DeserializeOwned>(&self, resource: &str) -> AppResult<T> {
        let body = self.fetch_text(resource).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 提交答案，原样返回评分应答
    ///
    /// `POST {base}/report`，请求体 `{task, apikey, answer}`。
    /// 传输失败或非 2xx 状态按普通步骤失败处理，不做特殊化。
    pub async fn report<T: Serialize>(&self, task: &str, answer: T) -> AppResult<ReportOutcome> {
        let url = format!("{}/report", self.base_url);
        let payload = ReportPayload {
            task: task.to_string(),
            apikey: self.apikey.clone(),
            answer,
        };

        info!("📤 上报任务 {} ...", task);

        let response = self.http.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::api_bad_status(
                &url,
                status.as_u16(),
                truncate_text(&body, 200),
            ));
        }

        let outcome: ReportOutcome = serde_json::from_str(&body)?;
        info!("✓ 评分应答: code={}, message={}", outcome.code, outcome.message);

        Ok(outcome)
    }
}
