//! 管道层
//!
//! 每个练习端点的处理流程都是同一个形状：
//! 抓取输入 → （可选的逐项并发转换）→ 汇总 → 上报结果。
//! 这里提供两件可复用的工具：
//! - `executor` - 失败即短路的顺序步骤执行器
//! - `fanout` - 保持顺序的全有或全无并发映射

pub mod executor;
pub mod fanout;

pub use executor::{Pipeline, PipelineOutcome, StepFailure};
pub use fanout::try_map_concurrent;
