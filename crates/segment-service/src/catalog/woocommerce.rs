//! WooCommerce REST API 客户端
//!
//! 直接读取店铺已发布商品，并转换为规则引擎使用的 [`Product`]。

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rule_engine::Product;
use segment_shared::error::{Result, SegmentError};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{ProductCatalog, build_client, transport_error};

const SERVICE_NAME: &str = "woocommerce";

/// WooCommerce 商品记录，只保留用到的字段
#[derive(Debug, Deserialize)]
struct WooProduct {
    id: i64,
    name: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    stock_status: String,
    #[serde(default)]
    stock_quantity: Option<i64>,
    #[serde(default)]
    categories: Vec<WooTerm>,
    #[serde(default)]
    tags: Vec<WooTerm>,
    #[serde(default)]
    on_sale: bool,
    #[serde(default)]
    date_created: Option<String>,
    #[serde(default)]
    date_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WooTerm {
    name: String,
}

impl From<WooProduct> for Product {
    fn from(woo: WooProduct) -> Self {
        let created_at = woo
            .date_created
            .as_deref()
            .and_then(parse_woo_datetime);
        let updated_at = woo
            .date_modified
            .as_deref()
            .and_then(parse_woo_datetime)
            .or(created_at);

        Product {
            id: woo.id,
            title: woo.name,
            price: woo.price.as_deref().map(parse_price).unwrap_or(0.0),
            stock_status: woo.stock_status,
            stock_quantity: woo.stock_quantity,
            category: woo
                .categories
                .into_iter()
                .next()
                .map(|c| c.name)
                .unwrap_or_else(|| "Uncategorized".to_string()),
            tags: woo.tags.into_iter().map(|t| t.name).collect(),
            on_sale: woo.on_sale,
            created_at,
            updated_at,
        }
    }
}

/// 解析价格文本：取最长的十进制数前缀，解析不出或非有限值时记为 0
///
/// WooCommerce 对未定价商品返回空串。
fn parse_price(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// WooCommerce 的 `date_created` 不带时区（店铺本地时间），按 UTC 处理
fn parse_woo_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// WooCommerce 目录
pub struct WooCommerceCatalog {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
    per_page: u32,
}

impl WooCommerceCatalog {
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let catalog = Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            per_page,
        };

        if catalog.base_url.is_empty()
            || catalog.consumer_key.is_empty()
            || catalog.consumer_secret.is_empty()
        {
            warn!("WooCommerce 凭证未完整配置，请求可能被上游拒绝");
        }

        Ok(catalog)
    }
}

#[async_trait]
impl ProductCatalog for WooCommerceCatalog {
    #[instrument(skip(self), fields(url = %self.base_url, per_page = self.per_page))]
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        let per_page = self.per_page.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("consumer_key", self.consumer_key.as_str()),
                ("consumer_secret", self.consumer_secret.as_str()),
                ("per_page", per_page.as_str()),
                ("status", "publish"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(SERVICE_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SegmentError::CatalogStatus(status.as_u16()));
        }

        let records: Vec<WooProduct> = response
            .json()
            .await
            .map_err(|e| SegmentError::CatalogDecode(e.to_string()))?;

        debug!(count = records.len(), "WooCommerce 返回商品");
        Ok(records.into_iter().map(Product::from).collect())
    }
}
