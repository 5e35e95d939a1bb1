//! 管道执行器
//!
//! 核心职责：按固定顺序执行一串命名的异步步骤，
//! 上一步的输出作为下一步的输入，任何一步失败立即短路。
//!
//! 错误归一化：步骤内部抛出的任何错误（网络库、解析、业务校验）
//! 在跨出步骤边界时统一转成一段文本消息，调用方永远不需要
//! 关心第三方库各自的错误形状。本层不做重试，
//! 需要重试的步骤在自己的 action 里处理。

use std::fmt;
use std::future::Future;

use tracing::{debug, error};

/// 单个步骤的失败信息
///
/// `step` 只用于服务端日志定位，不会出现在对外响应里
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: String,
    pub message: String,
}

/// 管道最终结果：最后一步的输出，或第一个失败步骤的信息
pub type PipelineOutcome<T> = Result<T, StepFailure>;

/// 失败即短路的顺序管道
///
/// 步骤序列在定义期通过链式 `step` 调用固定下来，运行期不可变。
/// 一旦某一步失败，后续所有 `step` 调用不再执行其 action。
pub struct Pipeline<T> {
    label: String,
    state: PipelineOutcome<T>,
}

impl<T> Pipeline<T> {
    /// 以调用方提供的种子值开始一条管道
    ///
    /// `label` 是练习标签，只用于日志
    pub fn start(label: impl Into<String>, seed: T) -> Self {
        Self {
            label: label.into(),
            state: Ok(seed),
        }
    }

    /// 追加一个命名步骤
    ///
    /// action 拿到上一步的输出，返回下一个值或失败。
    /// 错误类型只要求能格式化成文本，在这里完成归一化。
    pub async fn step<U, E, F, Fut>(self, name: &str, action: F) -> Pipeline<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
        E: fmt::Display,
    {
        let Pipeline { label, state } = self;

        let state = match state {
            Ok(value) => {
                debug!("[{}] ▶ 步骤 {} 开始", label, name);
                match action(value).await {
                    Ok(next) => Ok(next),
                    Err(e) => {
                        let message = e.to_string();
                        error!("[{}] ❌ 步骤 {} 失败: {}", label, name, message);
                        Err(StepFailure {
                            step: name.to_string(),
                            message,
                        })
                    }
                }
            }
            // 之前已经失败，跳过本步骤
            Err(failure) => Err(failure),
        };

        Pipeline { label, state }
    }

    /// 结束管道，取出最终结果
    pub fn finish(self) -> PipelineOutcome<T> {
        self.state
    }
}
