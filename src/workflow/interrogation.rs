//! S02E01 - 审讯录音分析（任务代码 mp3）
//!
//! 流程顺序：
//! 1. 收集本地录音文件
//! 2. 并发转写全部录音
//! 3. LLM 根据证词定位研究所地址
//! 4. 上报地址

use std::path::PathBuf;

use tracing::info;

use crate::app::AppState;
use crate::error::{AppError, AppResult, FileError};
use crate::models::ReportOutcome;
use crate::pipeline::{try_map_concurrent, Pipeline, PipelineOutcome};

pub async fn run(state: &AppState) -> PipelineOutcome<ReportOutcome> {
    Pipeline::start("s02e01", ())
        .step("收集录音文件", |_| list_recordings(state))
        .await
        .step("转写录音", |paths| transcribe_all(state, paths))
        .await
        .step("定位研究所地址", |transcript| {
            find_institute_address(state, transcript)
        })
        .await
        .step("上报结果", |address| state.centrala.report("mp3", address))
        .await
        .finish()
}

async fn list_recordings(state: &AppState) -> AppResult<Vec<PathBuf>> {
    let dir = &state.config.recordings_dir;
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|_| {
        AppError::File(FileError::DirectoryNotFound { path: dir.clone() })
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(dir.as_str(), e))?
    {
        if entry
            .file_type()
            .await
            .map_err(|e| AppError::file_read_failed(dir.as_str(), e))?
            .is_file()
        {
            paths.push(entry.path());
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::File(FileError::NoUsableFiles { path: dir.clone() }));
    }

    Ok(paths)
}

async fn transcribe_all(state: &AppState, paths: Vec<PathBuf>) -> AppResult<String> {
    info!("⏳ 正在转写 {} 段录音...", paths.len());

    let transcripts = try_map_concurrent(paths, |path| async move {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("nagranie.mp3")
            .to_string();
        state.speech.transcribe(&file_name, bytes).await
    })
    .await?;

    Ok(transcripts.join("\n\n"))
}

async fn find_institute_address(state: &AppState, transcript: String) -> AppResult<String> {
    info!("⏳ 正在定位研究所地址...");
    let address = state
        .llm
        .complete(&address_prompt(&transcript), None)
        .await?;
    info!("🏠 研究所地址: {}", address);
    Ok(address)
}

fn address_prompt(input: &str) -> String {
    format!(
        r#"Search in the given text for institute where profesor Andrzej Maj works or worked and using your knowledge return the street address of this institute or department (without any additional information or comments).

    <steps>
    - In the text Find the name of the institute or department where Andrzej Maj works or worked.
    - Based on your knowledge return the street address of this institute or department.
    - Return the street address in the format: "ul. <street name> <street number>".
    </steps>

    Text to search in: {}"#,
        input
    )
}
