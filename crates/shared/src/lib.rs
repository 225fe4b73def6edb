//! 共享库
//!
//! 包含分群服务共用的配置、错误处理、重试策略和可观测性基础设施代码。

pub mod config;
pub mod error;
pub mod observability;
pub mod retry;
