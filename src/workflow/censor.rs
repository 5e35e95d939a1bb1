//! S01E05 - 人员数据脱敏（任务代码 CENZURA）
//!
//! 敏感信息统一替换成 "CENZURA"。模型偶尔会连写两个标记，
//! 上报前在这里把相邻的重复标记确定性地折叠成一个。

use regex::Regex;
use tracing::info;

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ReportOutcome;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::utils::logging::truncate_text;

/// 脱敏标记
const MARKER: &str = "CENZURA";

pub async fn run(state: &AppState) -> PipelineOutcome<ReportOutcome> {
    Pipeline::start("s01e05", ())
        .step("获取人员数据", |_| state.centrala.fetch_text("cenzura.txt"))
        .await
        .step("脱敏处理", |text| censor_text(state, text))
        .await
        .step("上报结果", |answer| state.centrala.report("CENZURA", answer))
        .await
        .finish()
}

async fn censor_text(state: &AppState, text: String) -> AppResult<String> {
    info!("🙎 原始数据: {}", truncate_text(&text, 120));

    let censored = state.llm.complete(&censor_prompt(&text), None).await?;
    let censored = collapse_duplicate_markers(&censored)?;

    info!("🥷 脱敏结果: {}", truncate_text(&censored, 120));
    Ok(censored)
}

/// 把 "CENZURA CENZURA" 这类连写折叠成单个标记
fn collapse_duplicate_markers(text: &str) -> AppResult<String> {
    let pattern = format!(r"{}(?:\s+{})+", MARKER, MARKER);
    let re = Regex::new(&pattern).map_err(|e| AppError::Other(e.to_string()))?;
    Ok(re.replace_all(text, MARKER).into_owned())
}

fn censor_prompt(input: &str) -> String {
    format!(
        r#"Censore the given text and return it without any additional information or comments.
	Informations to censore are related to:
	- name
	- last name
	- address including street, number of street, city, country
	- age

	<rules>
	1. Replace all the sensitive information with "CENZURA" and return the censored text.
	2. Do not use doubled words "CENZURA CENZURA" in the output text:
		- Name and last name should be replaced with "CENZURA" only once.
		- Street name and number should be replaced with "CENZURA" only once.
	</rules>

	Example:
	- input : "Osoba Krzysztof Kwiatkowski. Mieszka w Szczecinie przy ul. Różanej 12. Ma 31 lat."
	- output: "Osoba CENZURA. Mieszka w CENZURA przy ul. CENZURA. Ma CENZURA lat."

    Text to censor: {}"#,
        input
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_duplicate_markers() {
        let input = "Osoba CENZURA CENZURA. Mieszka w CENZURA przy ul. CENZURA CENZURA.";
        let output = collapse_duplicate_markers(input).expect("折叠应该成功");
        assert_eq!(
            output,
            "Osoba CENZURA. Mieszka w CENZURA przy ul. CENZURA."
        );
    }

    #[test]
    fn test_collapse_keeps_single_markers() {
        let input = "Osoba CENZURA. Ma CENZURA lat.";
        let output = collapse_duplicate_markers(input).expect("折叠应该成功");
        assert_eq!(output, input);
    }

    #[test]
    fn test_collapse_long_runs() {
        let input = "CENZURA CENZURA  CENZURA mieszka w CENZURA.";
        let output = collapse_duplicate_markers(input).expect("折叠应该成功");
        assert_eq!(output, "CENZURA mieszka w CENZURA.");
    }
}
