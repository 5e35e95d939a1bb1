//! 数据模型
//!
//! 各接口的请求 / 响应结构，全部随请求创建、随响应销毁

use serde::{Deserialize, Serialize};

/// 上报给评分接口的数据
///
/// `answer` 必须已经是评分接口期望的最终形状，提交后不再做任何转换
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload<T> {
    pub task: String,
    pub apikey: String,
    pub answer: T,
}

/// 评分接口的应答
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub code: i64,
    pub message: String,
}

/// 校准文档（json.txt）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationDocument {
    #[serde(default)]
    pub apikey: String,
    pub description: String,
    pub copyright: String,
    #[serde(rename = "test-data")]
    pub test_data: Vec<TestItem>,
}

/// 校准文档中的单个条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestItem {
    pub question: String,
    pub answer: i64,
    /// 部分条目额外带一个开放性问题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<TestQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestQuestion {
    pub q: String,
    pub a: String,
}

/// 机器人描述（robotid.json）
#[derive(Debug, Clone, Deserialize)]
pub struct RobotInfo {
    pub description: String,
}

/// 机器人站点 /verify 接口的消息体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyMessage {
    pub text: String,
    #[serde(rename = "msgID")]
    pub msg_id: i64,
}

/// 归档文件及其识别出的文本内容
#[derive(Debug, Clone, Serialize)]
pub struct FileWithContent {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub content: String,
}

/// 归档分类结果
///
/// 字段缺失或类型不对会在反序列化时直接失败，
/// 这正是对 LLM 输出做的形状校验
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveCategories {
    pub people: Vec<String>,
    pub hardware: Vec<String>,
}
