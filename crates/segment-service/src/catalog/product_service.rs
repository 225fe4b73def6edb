//! 内部商品服务客户端

use std::time::Duration;

use async_trait::async_trait;
use rule_engine::Product;
use segment_shared::error::{Result, SegmentError};
use tracing::{debug, instrument};

use super::{ProductCatalog, build_client, transport_error};
use crate::dto::ProductListResponse;

const SERVICE_NAME: &str = "product-service";

/// 通过 `GET {base_url}/products` 读取商品服务同步好的目录
pub struct ProductServiceCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl ProductServiceCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProductCatalog for ProductServiceCatalog {
    #[instrument(skip(self), fields(url = %self.products_url()))]
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        let response = self
            .client
            .get(self.products_url())
            .send()
            .await
            .map_err(|e| transport_error(SERVICE_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SegmentError::CatalogStatus(status.as_u16()));
        }

        let body: ProductListResponse = response
            .json()
            .await
            .map_err(|e| SegmentError::CatalogDecode(e.to_string()))?;

        if !body.success {
            return Err(SegmentError::CatalogRejected);
        }

        debug!(count = body.data.len(), "商品服务返回目录");
        Ok(body.data)
    }
}
