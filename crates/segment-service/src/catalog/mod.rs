//! 商品目录来源
//!
//! 分群评估只依赖 [`ProductCatalog`]，具体来源在启动时按配置选择：
//! 内部商品服务、WooCommerce，或包在外层的缓存。

mod cached;
mod product_service;
mod woocommerce;

pub use cached::CachedCatalog;
pub use product_service::ProductServiceCatalog;
pub use woocommerce::WooCommerceCatalog;

use std::sync::Arc;

use async_trait::async_trait;
use rule_engine::Product;
use segment_shared::config::{CatalogConfig, CatalogSource};
use segment_shared::error::{Result, SegmentError};

/// 商品目录接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// 拉取当前全部商品
    async fn fetch_products(&self) -> Result<Vec<Product>>;
}

/// 按配置构造上游目录客户端（不含缓存）
pub fn from_config(config: &CatalogConfig) -> Result<Arc<dyn ProductCatalog>> {
    let catalog: Arc<dyn ProductCatalog> = match config.source {
        CatalogSource::ProductService => Arc::new(ProductServiceCatalog::new(
            config.base_url.clone(),
            config.timeout(),
        )?),
        CatalogSource::Woocommerce => Arc::new(WooCommerceCatalog::new(
            config.base_url.clone(),
            config.consumer_key.clone().unwrap_or_default(),
            config.consumer_secret.clone().unwrap_or_default(),
            config.per_page,
            config.timeout(),
        )?),
    };
    Ok(catalog)
}

/// 传输层错误归类：超时单独区分，其余视为上游不可达
fn transport_error(service: &str, err: reqwest::Error) -> SegmentError {
    if err.is_timeout() {
        SegmentError::CatalogTimeout {
            service: service.to_string(),
        }
    } else {
        SegmentError::CatalogUnavailable(err.to_string())
    }
}

fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SegmentError::Internal(format!("构建 HTTP 客户端失败: {}", e)))
}
