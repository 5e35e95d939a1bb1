//! 逐项并发转换
//!
//! 对固定集合中的每个元素并发地应用同一个异步转换，
//! 结果顺序与输入顺序一致，与完成先后无关。
//!
//! 失败策略是全有或全无：任何一项失败，整个操作失败，
//! 不返回部分结果。需要部分成功语义的调用方
//! 应在自己的转换函数里捕获错误，而不是让它抛出。

use std::future::Future;

use futures::future::try_join_all;

/// 并发映射一组元素，保持输入顺序
pub async fn try_map_concurrent<T, U, E, F, Fut>(items: Vec<T>, transform: F) -> Result<Vec<U>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<U, E>>,
{
    try_join_all(items.into_iter().map(transform)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_output_order_matches_input_order() {
        // 靠前的元素睡得更久，完成顺序与输入顺序相反
        let items = vec![30u64, 20, 10];

        let result = try_map_concurrent(items, |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, AppError>(ms * 2)
        })
        .await
        .expect("全部转换应该成功");

        assert_eq!(result, vec![60, 40, 20]);
    }

    #[tokio::test]
    async fn test_single_failure_fails_whole_operation() {
        let items = vec![1i64, 2, 3, 4];

        let result = try_map_concurrent(items, |n| async move {
            if n == 3 {
                Err(AppError::Other(format!("element {} uszkodzony", n)))
            } else {
                Ok(n * 10)
            }
        })
        .await;

        let err = result.expect_err("应该整体失败");
        assert!(err.to_string().contains("element 3"));
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_output() {
        let items: Vec<u8> = Vec::new();

        let result = try_map_concurrent(items, |n| async move { Ok::<_, AppError>(n) })
            .await
            .expect("空集合应该成功");

        assert!(result.is_empty());
    }
}
