// crates/gn_config/src/lib.rs
//! GeoNear Config Layer
//!
//! 服务配置：CRS 定义（结构化 JSON 或 WKT）与查询参数。
//!
//! # 模块概览
//!
//! - [`service_config`]: `ServiceConfig` 加载、校验与注册表构建
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```
//! use gn_config::ServiceConfig;
//!
//! let json = r#"{ "query": { "parallel_threshold": 8 } }"#;
//! let config = ServiceConfig::from_json_str(json).unwrap();
//! let registry = config.build_registry().unwrap();
//! assert!(registry.contains(config.query.projected_crs));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod service_config;

pub use error::ConfigError;
pub use service_config::{CrsSource, QueryConfig, ServiceConfig};
