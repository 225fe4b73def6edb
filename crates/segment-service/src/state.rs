//! 应用状态定义

use std::sync::Arc;

use crate::catalog::{CachedCatalog, ProductCatalog};

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 请求路径使用的目录（启用缓存时即为 `cache`）
    pub catalog: Arc<dyn ProductCatalog>,
    /// 缓存目录，刷新间隔为 0 时不启用
    pub cache: Option<Arc<CachedCatalog>>,
}

impl AppState {
    /// 直连上游，不经过缓存
    pub fn direct(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            catalog,
            cache: None,
        }
    }

    pub fn cached(cache: Arc<CachedCatalog>) -> Self {
        Self {
            catalog: cache.clone(),
            cache: Some(cache),
        }
    }
}
