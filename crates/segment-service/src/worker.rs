//! 商品目录刷新 Worker
//!
//! 按固定间隔刷新 [`CachedCatalog`]，启动时立即执行首次加载。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::catalog::CachedCatalog;

pub struct CatalogRefreshWorker {
    catalog: Arc<CachedCatalog>,
    interval: Duration,
}

impl CatalogRefreshWorker {
    pub fn new(catalog: Arc<CachedCatalog>, interval: Duration) -> Self {
        Self { catalog, interval }
    }

    /// 主循环，`shutdown` 变为 true 或发送端关闭时退出
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval = ?self.interval, "CatalogRefreshWorker 已启动");

        let mut ticker = tokio::time::interval(self.interval);
        // 上游慢时不补跑积压的 tick
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.catalog.refresh().await {
                        error!(code = e.code(), error = %e, "定时刷新商品目录失败");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("CatalogRefreshWorker 已停止");
    }
}
