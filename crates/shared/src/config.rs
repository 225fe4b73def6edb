//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// 商品目录来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// 内部商品服务，`GET {base_url}/products` 返回 `{success, data, count}`
    #[default]
    ProductService,
    /// 直连 WooCommerce REST API
    Woocommerce,
}

/// 商品目录配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub base_url: String,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    /// 未配置时按来源取默认值：商品服务 10 秒，WooCommerce 30 秒
    pub timeout_seconds: Option<u64>,
    /// 缓存刷新间隔，0 表示不缓存、每次请求直接拉取
    pub refresh_interval_seconds: u64,
    pub per_page: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::ProductService,
            base_url: "http://localhost:4000".to_string(),
            consumer_key: None,
            consumer_secret: None,
            timeout_seconds: None,
            refresh_interval_seconds: 20,
            per_page: 100,
        }
    }
}

impl CatalogConfig {
    /// 上游请求超时
    pub fn timeout(&self) -> Duration {
        let secs = self.timeout_seconds.unwrap_or(match self.source {
            CatalogSource::ProductService => 10,
            CatalogSource::Woocommerce => 30,
        });
        Duration::from_secs(secs)
    }

    /// 缓存刷新间隔，`None` 表示禁用缓存
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_seconds > 0)
            .then(|| Duration::from_secs(self.refresh_interval_seconds))
    }
}

/// CORS 配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// 为空时允许所有来源
    pub allowed_origins: Vec<String>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub observability: ObservabilityConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（SEGMENT_ 前缀，层级用双下划线，如 SEGMENT_CATALOG__BASE_URL -> catalog.base_url）
    /// 5. PORT 环境变量覆盖监听端口
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        // .env 文件可选
        let _ = dotenvy::dotenv();

        let env = std::env::var("SEGMENT_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("SEGMENT")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if let Some(port) = Self::port_from_env() {
            config.server.port = port;
        }

        Ok(config)
    }

    /// 读取 PORT 环境变量，无法解析时忽略
    fn port_from_env() -> Option<u16> {
        std::env::var("PORT").ok().and_then(|v| v.parse().ok())
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
