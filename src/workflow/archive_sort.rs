//! S02E04 - 混合格式归档分类（任务代码 kategorie）
//!
//! 归档目录里混着 .txt / .mp3 / .png 三种巡逻报告，
//! 逐个提取文本内容后让 LLM 按"人员踪迹 / 硬件故障"分类。

use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::AppState;
use crate::error::{AppError, AppResult, FileError};
use crate::models::{ArchiveCategories, FileWithContent, ReportOutcome};
use crate::pipeline::{try_map_concurrent, Pipeline, PipelineOutcome};

/// 支持的归档文件扩展名
const SUPPORTED_EXTS: [&str; 3] = ["txt", "mp3", "png"];

pub async fn run(state: &AppState) -> PipelineOutcome<ReportOutcome> {
    Pipeline::start("s02e04", ())
        .step("收集归档文件", |_| list_archive_files(state))
        .await
        .step("提取文件内容", |paths| extract_contents(state, paths))
        .await
        .step("分类归档", |files| categorize(state, files))
        .await
        .step("上报结果", |categories| {
            state.centrala.report("kategorie", categories)
        })
        .await
        .finish()
}

async fn list_archive_files(state: &AppState) -> AppResult<Vec<PathBuf>> {
    let dir = &state.config.archive_dir;
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|_| {
        AppError::File(FileError::DirectoryNotFound { path: dir.clone() })
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(dir.as_str(), e))?
    {
        let path = entry.path();
        if extension_of(&path)
            .map(|ext| SUPPORTED_EXTS.contains(&ext.as_str()))
            .unwrap_or(false)
        {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::File(FileError::NoUsableFiles { path: dir.clone() }));
    }

    info!("📁 找到 {} 个归档文件", paths.len());
    Ok(paths)
}

/// 按格式提取每个文件的文本内容，三种格式并发处理
async fn extract_contents(
    state: &AppState,
    paths: Vec<PathBuf>,
) -> AppResult<Vec<FileWithContent>> {
    try_map_concurrent(paths, |path| async move {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let ext = extension_of(&path).unwrap_or_default();

        let content = match ext.as_str() {
            "txt" => tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?,
            "mp3" => {
                info!("🎙️ 转写音频: {}", file_name);
                let bytes = read_bytes(&path).await?;
                state.speech.transcribe(&file_name, bytes).await?
            }
            "png" => {
                info!("🔍 识别图片: {}", file_name);
                let bytes = read_bytes(&path).await?;
                let text = state.ocr.recognize(&file_name, bytes, "pol").await?;
                text.replace('\n', " ")
            }
            other => {
                return Err(AppError::Other(format!("不支持的文件类型: {}", other)));
            }
        };

        Ok::<_, AppError>(FileWithContent { file_name, content })
    })
    .await
}

async fn categorize(
    state: &AppState,
    files: Vec<FileWithContent>,
) -> AppResult<ArchiveCategories> {
    info!("⏳ 正在分类 {} 条记录...", files.len());

    let input_json = serde_json::to_string(&files)?;
    let text = state
        .llm
        .complete(&categorize_prompt(&input_json), None)
        .await?;

    // 形状校验：缺字段或类型不对都算模型输出不合格，立即失败
    let categories: ArchiveCategories = serde_json::from_str(&text)
        .map_err(|e| AppError::llm_malformed_output(format!("{} (响应: {})", e, text)))?;

    info!(
        "📊 分类完成: people={}, hardware={}",
        categories.people.len(),
        categories.hardware.len()
    );
    Ok(categories)
}

async fn read_bytes(path: &Path) -> AppResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn categorize_prompt(input: &str) -> String {
    format!(
        r#"Return json with the following structure:

	{{
        "people": ["fileName", ...],
        "hardware": ["filename", ...],
    }}

	To create this json, analyze the InputJson and find all records including information about captured people or traces of their presence

	<rules>
    - In the key "people" include fileNames of all records with information about people or traces of their presence.
	- In the key "hardware" include fileNames of all records with hardware issues like faults or repairs, omit software info.
	- If a record does not fit into any of the above categories, skip it.
	- Sort the fileNames in ascending order
	- Return the json without any additional text, annotations or explanations.
	- Do not use any special sympols or quotes in the response, just plain json.
    </rules>

    InputJson: {}"#,
        input
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of_is_lowercased() {
        assert_eq!(
            extension_of(Path::new("raport-01.PNG")),
            Some("png".to_string())
        );
        assert_eq!(extension_of(Path::new("bez_rozszerzenia")), None);
    }

    #[test]
    fn test_malformed_model_output_is_rejected() {
        let err = serde_json::from_str::<ArchiveCategories>(r#"{"people": "not-a-list"}"#)
            .expect_err("类型不对应该反序列化失败");
        assert!(err.to_string().contains("people") || !err.to_string().is_empty());
    }
}
