//! S01E03 - 校准文档修复（任务代码 JSON）
//!
//! 流程顺序：
//! 1. 抓取 json.txt 校准文档
//! 2. 逐条重算加法并修正错误答案，内嵌的开放问题交给 LLM 并发求解
//! 3. 整份修正后的文档上报

use tracing::{info, warn};

use crate::app::AppState;
use crate::error::{AppError, AppResult, BusinessError};
use crate::models::{CalibrationDocument, ReportOutcome};
use crate::pipeline::{try_map_concurrent, Pipeline, PipelineOutcome};

pub async fn run(state: &AppState) -> PipelineOutcome<ReportOutcome> {
    Pipeline::start("s01e03", ())
        .step("获取校准文档", |_| fetch_document(state))
        .await
        .step("校验数据", |doc| validate_document(state, doc))
        .await
        .step("上报结果", |doc| state.centrala.report("JSON", doc))
        .await
        .finish()
}

async fn fetch_document(state: &AppState) -> AppResult<CalibrationDocument> {
    let mut doc: CalibrationDocument = state.centrala.fetch_json("json.txt").await?;
    // 上报的文档里要求带上自己的凭证
    doc.apikey = state.centrala.apikey().to_string();
    Ok(doc)
}

/// 逐条校验：加法在本地重算，开放问题并发交给 LLM
async fn validate_document(
    state: &AppState,
    mut doc: CalibrationDocument,
) -> AppResult<CalibrationDocument> {
    let items = std::mem::take(&mut doc.test_data);
    info!("⏳ 校验 {} 条数据...", items.len());

    let validated = try_map_concurrent(items, |mut item| async move {
        let expected = addition_result(&item.question)?;
        if item.answer != expected {
            warn!(
                "⚠️ 问题: {}, 答案: {}, 应为: {}，已修正",
                item.question, item.answer, expected
            );
            item.answer = expected;
        }

        if let Some(test) = item.test.as_mut() {
            info!("🧠 检测到开放问题: {}，正在求解...", test.q);
            let answer = state
                .llm
                .complete(&open_question_prompt(&test.q), None)
                .await?;
            info!("🤖 {} 答案: {}", test.q, answer);
            test.a = answer;
        }

        Ok::<_, AppError>(item)
    })
    .await?;

    doc.test_data = validated;
    Ok(doc)
}

/// 重算形如 "a + b" 的加法算式
fn addition_result(input: &str) -> AppResult<i64> {
    let mut parts = input.split('+');
    let a = parts.next().and_then(|s| s.trim().parse::<i64>().ok());
    let b = parts.next().and_then(|s| s.trim().parse::<i64>().ok());

    match (a, b) {
        (Some(a), Some(b)) => Ok(a + b),
        _ => Err(AppError::Business(BusinessError::MalformedAddition {
            input: input.to_string(),
        })),
    }
}

fn open_question_prompt(question: &str) -> String {
    format!(
        "Answer the given question without any additional information or comments, provide only the correct answer as word or number.
    Question: {}",
        question
    )
}
