/// 语音转写客户端
///
/// 走兼容 OpenAI 的 `audio/transcriptions` 接口（Groq Whisper）
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::utils::logging::truncate_text;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// 语音转写客户端
pub struct SpeechClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl SpeechClient {
    /// 创建新的转写客户端
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.groq_api_base.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.speech_model_name.clone(),
        }
    }

    /// 转写一段音频
    ///
    /// # 参数
    /// - `file_name`: 文件名（上游按扩展名识别格式）
    /// - `bytes`: 音频内容
    ///
    /// # 返回
    /// 返回转写文本
    pub async fn transcribe(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!("转写音频: {} ({} 字节)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("audio/mpeg")
            .map_err(|e| AppError::api_request_failed(url.as_str(), e))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::api_bad_status(
                &url,
                status.as_u16(),
                truncate_text(&body, 200),
            ));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)?;
        Ok(parsed.text)
    }
}
