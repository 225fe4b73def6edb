//! 商品分群服务
//!
//! 对外提供 JSON API：按规则列表筛选商品目录，目录来自内部商品服务或 WooCommerce，
//! 由后台 Worker 定期刷新缓存。

pub mod catalog;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod worker;
