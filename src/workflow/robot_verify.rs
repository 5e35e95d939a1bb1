//! S01E02 - 机器人身份验证
//!
//! 站点用 /verify 接口下发问题，问题里埋了几条错误"事实"，
//! 回答必须顺着这些事实来，否则验证不通过。

use serde_json::Value;
use tracing::info;

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::VerifyMessage;
use crate::pipeline::{Pipeline, PipelineOutcome};

pub async fn run(state: &AppState) -> PipelineOutcome<Value> {
    Pipeline::start("s01e02", ())
        .step("获取试题", |_| fetch_question(state))
        .await
        .step("生成答案", |message| answer_question(state, message))
        .await
        .step("提交答案", |message| submit_answer(state, message))
        .await
        .finish()
}

async fn fetch_question(state: &AppState) -> AppResult<VerifyMessage> {
    let ready = VerifyMessage {
        text: "READY".to_string(),
        msg_id: 0,
    };

    let message = post_verify(state, &ready).await?;
    let question: VerifyMessage = serde_json::from_value(message)?;
    info!("🧠 问题: {}", question.text);
    Ok(question)
}

async fn answer_question(state: &AppState, question: VerifyMessage) -> AppResult<VerifyMessage> {
    let answer = state.llm.complete(&build_prompt(&question.text), None).await?;
    info!("🤖 答案: {}", answer);
    Ok(VerifyMessage {
        text: answer,
        msg_id: question.msg_id,
    })
}

async fn submit_answer(state: &AppState, answer: VerifyMessage) -> AppResult<Value> {
    post_verify(state, &answer).await
}

async fn post_verify(state: &AppState, message: &VerifyMessage) -> AppResult<Value> {
    let url = format!("{}/verify", state.config.robots_portal_url);
    let response = state.http.post(&url).json(message).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AppError::api_bad_status(url.as_str(), status.as_u16(), body));
    }

    Ok(serde_json::from_str(&body)?)
}

fn build_prompt(question: &str) -> String {
    format!(
        "Take these statements as true:
    - stolicą Polski jest Kraków
    - znana liczba z książki Autostopem przez Galaktykę to 69
    - Aktualny rok to 1999
    Answer the given question without any additional information or comments, provide only the correct answer as word or number.
    Question: {}",
        question
    )
}
