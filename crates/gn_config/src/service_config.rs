// crates/gn_config/src/service_config.rs
//! 服务配置
//!
//! JSON 格式，示例：
//!
//! ```json
//! {
//!   "crs": [
//!     {
//!       "kind": "Geographic",
//!       "id": 4326,
//!       "params": {
//!         "name": "WGS 84",
//!         "ellipsoid": { "a": 6378137.0, "f": 0.0033528106647474805 }
//!       }
//!     },
//!     { "wkt": "PROJCS[\"NAD83(HARN) / Washington North\", ...]" }
//!   ],
//!   "query": { "query_crs": 4326, "projected_crs": 2855, "parallel_threshold": 64 }
//! }
//! ```
//!
//! 新增坐标系只需在 `crs` 中追加条目。

use crate::error::ConfigError;
use gn_geo::crs::{CrsDefinition, CrsId, CrsRegistry, WASHINGTON_NORTH_ID, WGS84_ID};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// 单个 CRS 来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrsSource {
    /// WKT 文本，缺少 AUTHORITY 时使用 `id`
    Wkt {
        /// WKT 文本
        wkt: String,
        /// 标识
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<CrsId>,
    },
    /// 结构化定义
    Definition(CrsDefinition),
}

/// 查询参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 查询坐标所在的地理坐标系
    pub query_crs: CrsId,
    /// 计算距离使用的投影坐标系
    pub projected_crs: CrsId,
    /// 候选数达到该值时并行计算
    pub parallel_threshold: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query_crs: WGS84_ID,
            projected_crs: WASHINGTON_NORTH_ID,
            parallel_threshold: 64,
        }
    }
}

/// 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// CRS 定义
    #[serde(default = "default_crs")]
    pub crs: Vec<CrsSource>,
    /// 查询参数
    #[serde(default)]
    pub query: QueryConfig,
}

fn default_crs() -> Vec<CrsSource> {
    CrsRegistry::with_defaults()
        .definitions()
        .cloned()
        .map(CrsSource::Definition)
        .collect()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            crs: default_crs(),
            query: QueryConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// 从 JSON 文件加载并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), crs = config.crs.len(), "加载服务配置");
        Ok(config)
    }

    /// 从 JSON 文本解析并校验
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 构建 CRS 注册表
    pub fn build_registry(&self) -> Result<CrsRegistry, ConfigError> {
        let mut builder = CrsRegistry::builder();
        for source in &self.crs {
            builder = match source {
                CrsSource::Wkt { wkt, id } => builder.register_wkt(wkt, *id)?,
                CrsSource::Definition(def) => builder.register(def.clone()),
            };
        }
        let registry = builder.build()?;
        debug!(ids = ?registry.ids().collect::<Vec<_>>(), "CRS 注册表");
        Ok(registry)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.parallel_threshold == 0 {
            return Err(ConfigError::invalid_value(
                "query.parallel_threshold",
                self.query.parallel_threshold,
                "必须至少为 1",
            ));
        }

        let registry = self.build_registry()?;

        match registry.lookup(self.query.query_crs) {
            Ok(def) if def.is_geographic() => {}
            Ok(_) => {
                return Err(ConfigError::invalid_value(
                    "query.query_crs",
                    self.query.query_crs,
                    "必须是地理坐标系",
                ))
            }
            Err(_) => {
                return Err(ConfigError::invalid_value(
                    "query.query_crs",
                    self.query.query_crs,
                    "未注册",
                ))
            }
        }

        match registry.lookup(self.query.projected_crs) {
            Ok(def) if def.is_projected() => Ok(()),
            Ok(_) => Err(ConfigError::invalid_value(
                "query.projected_crs",
                self.query.projected_crs,
                "必须是投影坐标系",
            )),
            Err(_) => Err(ConfigError::invalid_value(
                "query.projected_crs",
                self.query.projected_crs,
                "未注册",
            )),
        }
    }
}
