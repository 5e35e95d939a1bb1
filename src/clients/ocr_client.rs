/// OCR 客户端
///
/// 图片字节 + 语言提示 → 识别出的文字。
/// 识别服务是外部协作方，这里只定义对它的窄接口。
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::utils::logging::truncate_text;

#[derive(Debug, Deserialize)]
struct OcrResponse {
    text: String,
}

/// OCR 客户端
pub struct OcrClient {
    http: reqwest::Client,
    base_url: String,
}

impl OcrClient {
    /// 创建新的 OCR 客户端
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.ocr_api_base.clone(),
        }
    }

    /// 识别图片中的文字
    ///
    /// # 参数
    /// - `file_name`: 文件名
    /// - `bytes`: 图片内容
    /// - `language`: 语言提示，例如 "pol"
    pub async fn recognize(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        language: &str,
    ) -> AppResult<String> {
        let url = format!("{}/ocr", self.base_url);
        debug!("识别图片: {} ({} 字节, 语言: {})", file_name, bytes.len(), language);

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .map_err(|e| AppError::api_request_failed(url.as_str(), e))?;
        let form = Form::new()
            .part("file", part)
            .text("language", language.to_string());

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::api_bad_status(
                &url,
                status.as_u16(),
                truncate_text(&body, 200),
            ));
        }

        let parsed: OcrResponse = serde_json::from_str(&body)?;
        Ok(parsed.text)
    }
}
