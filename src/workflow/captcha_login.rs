//! S01E01 - 机器人登录页验证
//!
//! 流程顺序：
//! 1. 抓取登录页 HTML
//! 2. 从页面中提取验证问题
//! 3. LLM 生成年份答案
//! 4. 带答案提交登录表单

use regex::Regex;
use serde_json::Value;
use tracing::info;

use crate::app::AppState;
use crate::error::{AppError, AppResult, BusinessError};
use crate::pipeline::{Pipeline, PipelineOutcome};

pub async fn run(state: &AppState) -> PipelineOutcome<Value> {
    Pipeline::start("s01e01", ())
        .step("获取登录页面", |_| fetch_login_page(state))
        .await
        .step("提取验证问题", |html| async move {
            extract_captcha_question(&html)
        })
        .await
        .step("生成答案", |question| answer_question(state, question))
        .await
        .step("提交登录表单", |answer| submit_login(state, answer))
        .await
        .finish()
}

async fn fetch_login_page(state: &AppState) -> AppResult<String> {
    let url = &state.config.robots_login_url;
    let response = state.http.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AppError::api_bad_status(url.as_str(), status.as_u16(), ""));
    }

    Ok(body)
}

/// 问题藏在 id="human-question" 的元素里
fn extract_captcha_question(html: &str) -> AppResult<String> {
    let re = Regex::new(r#"<p id="human-question">.*?<br ?/?>(.*?)</p>"#)
        .map_err(|e| AppError::Other(e.to_string()))?;

    let question = re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or(AppError::Business(BusinessError::CaptchaQuestionNotFound))?;

    info!("🧠 验证问题: {}", question);
    Ok(question)
}

async fn answer_question(state: &AppState, question: String) -> AppResult<String> {
    let prompt = format!(
        "Answer the question: {}. Provide only the year without any explanation or comments.",
        question
    );
    let answer = state.llm.complete(&prompt, None).await?;
    info!("🤖 答案: {}", answer);
    Ok(answer)
}

async fn submit_login(state: &AppState, answer: String) -> AppResult<Value> {
    let url = &state.config.robots_login_url;
    let form = [
        ("username", state.config.robots_username.as_str()),
        ("password", state.config.robots_password.as_str()),
        ("answer", answer.as_str()),
    ];

    let response = state.http.post(url).form(&form).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AppError::api_bad_status(url.as_str(), status.as_u16(), ""));
    }

    Ok(Value::String(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_captcha_question() {
        let html = r#"<form><p id="human-question">Question:<br />Rok powstania ONZ?</p></form>"#;
        let question = extract_captcha_question(html).expect("应该提取到问题");
        assert_eq!(question, "Rok powstania ONZ?");
    }

    #[test]
    fn test_extract_captcha_question_missing() {
        let html = "<html><body>brak pytania</body></html>";
        let err = extract_captcha_question(html).expect_err("缺少问题时应该失败");
        assert!(err.to_string().contains("验证问题"));
    }
}
