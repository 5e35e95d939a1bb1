//! # Centrala Tasks
//!
//! 练习管道服务器：每个端点执行一条固定的"抓取 → 转换 → 上报"管道
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础能力层（Clients）
//! - `clients/` - 各协作方的窄接口客户端，启动时构造一次
//! - `CentralaClient` - 数据源抓取 + 答案上报
//! - `LlmClient` - 文本补全 + 图像生成
//! - `SpeechClient` / `OcrClient` - 语音转写 / 文字识别
//!
//! ### ② 管道层（Pipeline）
//! - `pipeline/executor` - 失败即短路的顺序步骤执行器
//! - `pipeline/fanout` - 保持顺序的全有或全无并发映射
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 每个练习一个模块，把客户端能力串成管道
//!
//! ### ④ 入口层（App）
//! - `app` - 路由表、共享状态注入、响应包装
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::{App, AppState};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ReportOutcome, ReportPayload};
pub use pipeline::{try_map_concurrent, Pipeline, PipelineOutcome, StepFailure};
