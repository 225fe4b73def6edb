//! 目录快照缓存
//!
//! 后台 Worker 定期调用 [`CachedCatalog::refresh`] 原子替换快照，
//! 请求路径只读快照，不触达上游。

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use rule_engine::Product;
use segment_shared::error::{Result, SegmentError};
use segment_shared::observability::metrics;
use segment_shared::retry::{RetryPolicy, retry_with_policy};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::ProductCatalog;

pub struct CachedCatalog {
    inner: Arc<dyn ProductCatalog>,
    snapshot: ArcSwapOption<Vec<Product>>,
    retry_policy: RetryPolicy,
    /// 冷缓存时串行化首次加载，并发读只触发一次上游请求
    first_load: Mutex<()>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn ProductCatalog>) -> Self {
        Self::with_retry_policy(inner, RetryPolicy::default())
    }

    pub fn with_retry_policy(inner: Arc<dyn ProductCatalog>, retry_policy: RetryPolicy) -> Self {
        Self {
            inner,
            snapshot: ArcSwapOption::const_empty(),
            retry_policy,
            first_load: Mutex::new(()),
        }
    }

    /// 从上游拉取并替换快照，返回新快照的商品数
    ///
    /// 失败时保留旧快照。
    pub async fn refresh(&self) -> Result<usize> {
        let result = retry_with_policy(
            &self.retry_policy,
            "catalog_refresh",
            SegmentError::is_retryable,
            || self.inner.fetch_products(),
        )
        .await;

        match result {
            Ok(products) => {
                let count = products.len();
                self.snapshot.store(Some(Arc::new(products)));
                metrics::record_catalog_refresh("success");
                metrics::set_catalog_products(count);
                info!(count, "商品目录已刷新");
                Ok(count)
            }
            Err(e) => {
                metrics::record_catalog_refresh("failure");
                warn!(
                    code = e.code(),
                    error = %e,
                    cached = self.cached_len(),
                    "商品目录刷新失败，继续使用旧快照"
                );
                Err(e)
            }
        }
    }

    /// 当前快照，尚未成功加载过时为 `None`
    pub fn snapshot(&self) -> Option<Arc<Vec<Product>>> {
        self.snapshot.load_full()
    }

    fn cached_len(&self) -> Option<usize> {
        self.snapshot().map(|products| products.len())
    }
}

#[async_trait]
impl ProductCatalog for CachedCatalog {
    /// 返回快照副本；从未加载成功时先同步刷新一次
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        if let Some(products) = self.snapshot() {
            return Ok(products.as_ref().clone());
        }

        let _guard = self.first_load.lock().await;
        // 等锁期间可能已有其他请求加载完成
        if let Some(products) = self.snapshot() {
            return Ok(products.as_ref().clone());
        }

        self.refresh().await?;
        Ok(self
            .snapshot()
            .map(|products| products.as_ref().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockProductCatalog;
    use mockall::Sequence;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn product(id: i64) -> Product {
        Product {
            id,
            title: format!("Product {}", id),
            price: 10.0 * id as f64,
            stock_status: "instock".to_string(),
            stock_quantity: Some(id),
            category: "General".to_string(),
            tags: vec![],
            on_sale: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// 每次请求耗时一秒的上游，记录被调用次数
    struct SlowCatalog {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ProductCatalog for SlowCatalog {
        async fn fetch_products(&self) -> Result<Vec<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(vec![product(1), product(2)])
        }
    }

    fn no_retry(inner: MockProductCatalog) -> CachedCatalog {
        CachedCatalog::with_retry_policy(Arc::new(inner), RetryPolicy::none())
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let mut mock = MockProductCatalog::new();
        let mut seq = Sequence::new();
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![product(1)]));
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![product(1), product(2)]));

        let cached = no_retry(mock);
        assert!(cached.snapshot().is_none());

        assert_eq!(cached.refresh().await.unwrap(), 1);
        assert_eq!(cached.refresh().await.unwrap(), 2);
        assert_eq!(cached.fetch_products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let mut mock = MockProductCatalog::new();
        let mut seq = Sequence::new();
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![product(1), product(2)]));
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(SegmentError::CatalogStatus(500)));

        let cached = no_retry(mock);
        cached.refresh().await.unwrap();

        assert!(cached.refresh().await.is_err());
        let products = cached.fetch_products().await.unwrap();
        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_first_read_loads_through() {
        let mut mock = MockProductCatalog::new();
        mock.expect_fetch_products()
            .times(1)
            .returning(|| Ok(vec![product(3)]));

        let cached = no_retry(mock);

        // 第二次读取命中快照，不再访问上游
        assert_eq!(cached.fetch_products().await.unwrap().len(), 1);
        assert_eq!(cached.fetch_products().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_cold_reads_load_once() {
        let upstream = Arc::new(SlowCatalog {
            calls: AtomicU32::new(0),
        });
        let cached = CachedCatalog::with_retry_policy(upstream.clone(), RetryPolicy::none());

        let (a, b, c, d) = tokio::join!(
            cached.fetch_products(),
            cached.fetch_products(),
            cached.fetch_products(),
            cached.fetch_products(),
        );

        for products in [a, b, c, d] {
            assert_eq!(products.unwrap().len(), 2);
        }
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_first_load_lets_next_read_retry() {
        let mut mock = MockProductCatalog::new();
        let mut seq = Sequence::new();
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(SegmentError::CatalogStatus(503)));
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![product(4)]));

        let cached = no_retry(mock);

        assert!(cached.fetch_products().await.is_err());
        assert_eq!(cached.fetch_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_read_propagates_upstream_error() {
        let mut mock = MockProductCatalog::new();
        mock.expect_fetch_products()
            .returning(|| Err(SegmentError::CatalogUnavailable("refused".into())));

        let cached = no_retry(mock);
        let err = cached.fetch_products().await.unwrap_err();
        assert!(matches!(err, SegmentError::CatalogUnavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_retries_transient_errors() {
        let mut mock = MockProductCatalog::new();
        let mut seq = Sequence::new();
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(SegmentError::CatalogStatus(503)));
        mock.expect_fetch_products()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![product(1)]));

        let policy = RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 2.0,
        };
        let cached = CachedCatalog::with_retry_policy(Arc::new(mock), policy);

        assert_eq!(cached.refresh().await.unwrap(), 1);
    }
}
