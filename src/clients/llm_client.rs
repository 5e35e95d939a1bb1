//! LLM 客户端
//!
//! ## 技术栈
//! - 聊天补全使用 `async-openai` crate
//! - 支持自定义 API 端点，兼容 OpenAI API 的服务
//! - 图像生成走 `images/generations` HTTP 接口

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::utils::logging::truncate_text;

/// LLM 客户端
///
/// 职责：
/// - 文本补全：提示词 → 去掉首尾空白的补全文本
/// - 图像生成：提示词 → 生成的图片 URL 列表
/// - 不关心提示词内容，也不关心流程顺序
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    chat_model: String,
    image_model: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_api_base);

        let client = Client::with_config(openai_config);

        Self {
            client,
            http,
            api_base: config.openai_api_base.clone(),
            api_key: config.openai_api_key.clone(),
            chat_model: config.chat_model_name.clone(),
            image_model: config.image_model_name.clone(),
        }
    }

    /// 发送聊天请求
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回去掉首尾空白的补全文本
    pub async fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.chat_model);
        debug!("用户消息: {}", truncate_text(user_message, 200));

        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| AppError::llm_api_failed(self.chat_model.as_str(), e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 添加用户消息
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::llm_api_failed(self.chat_model.as_str(), e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| AppError::llm_api_failed(self.chat_model.as_str(), e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(self.chat_model.as_str(), e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: self.chat_model.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }

    /// 根据提示词生成图片
    ///
    /// # 返回
    /// 返回生成的图片 URL 列表（可能为空，由调用方决定如何处理）
    pub async fn generate_image(&self, prompt: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/images/generations", self.api_base);
        debug!("调用图像生成 API，模型: {}", self.image_model);

        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024"
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AppError::api_bad_status(
                &url,
                status.as_u16(),
                truncate_text(&text, 200),
            ));
        }

        let result: Value = serde_json::from_str(&text)?;
        let urls = result
            .get("data")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("url").and_then(|u| u.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(urls)
    }
}
