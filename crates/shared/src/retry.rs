//! 重试策略与执行器
//!
//! 商品目录拉取遇到网络抖动或上游 5xx 时按指数退避自动重试。
//! 哪些错误值得重试由调用方传入的 `is_retryable` 闭包决定。

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::SegmentError;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次执行）
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// 退避时间上限
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    /// 最多重试 3 次，初始等待 500 毫秒，最大等待 5 秒，倍数 2.0
    ///
    /// 目录刷新周期默认 20 秒，总退避时间需要明显短于刷新间隔。
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 不重试，只执行一次
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// 第 N 次重试前的等待时间（attempt 从 0 开始），不超过 `max_delay`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64;
        let delay_ms = base_ms * self.multiplier.powi(attempt as i32);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// 带重试的异步执行器
///
/// 不可重试的错误直接返回；重试次数耗尽时返回最后一次的错误。
pub async fn retry_with_policy<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_retryable: impl Fn(&SegmentError) -> bool,
    mut operation: F,
) -> Result<T, SegmentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SegmentError>>,
{
    let mut attempt: u32 = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(operation = operation_name, attempt, "重试后成功");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_retryable(&err) {
            warn!(operation = operation_name, code = err.code(), error = %err, "不可重试的错误");
            return Err(err);
        }

        if !policy.should_retry(attempt) {
            warn!(
                operation = operation_name,
                attempt,
                max_retries = policy.max_retries,
                error = %err,
                "已达最大重试次数"
            );
            return Err(err);
        }

        let delay = policy.delay_for_attempt(attempt);
        warn!(
            operation = operation_name,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "操作失败，退避后重试"
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_delay_backoff_is_capped() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(20), Duration::from_secs(5));
    }

    #[test]
    fn test_none_policy_never_retries() {
        assert!(!RetryPolicy::none().should_retry(0));
        assert!(RetryPolicy::default().should_retry(2));
        assert!(!RetryPolicy::default().should_retry(3));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_policy(
            &fast_policy(3),
            "fetch_products",
            SegmentError::is_retryable,
            || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(SegmentError::CatalogStatus(503))
                    } else {
                        Ok(7)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = retry_with_policy(
            &fast_policy(3),
            "fetch_products",
            SegmentError::is_retryable,
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(SegmentError::CatalogRejected)
                }
            },
        )
        .await;

        assert!(matches!(result, Err(SegmentError::CatalogRejected)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = retry_with_policy(
            &fast_policy(2),
            "fetch_products",
            SegmentError::is_retryable,
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(SegmentError::CatalogUnavailable("connection refused".into()))
                }
            },
        )
        .await;

        assert!(matches!(result, Err(SegmentError::CatalogUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
