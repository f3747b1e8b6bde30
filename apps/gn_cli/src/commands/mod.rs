// apps/gn_cli/src/commands/mod.rs
//! 子命令与共享的运行上下文

pub mod crs;
pub mod nearest;
pub mod project;

use anyhow::Result;
use gn_config::ServiceConfig;
use gn_foundation::GnError;
use gn_geo::crs::CrsRegistry;
use gn_geo::transform::TransformBuilder;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 进程内共享的注册表与变换构建器
pub struct Context {
    pub config: ServiceConfig,
    pub registry: Arc<CrsRegistry>,
    pub builder: Arc<TransformBuilder>,
}

impl Context {
    /// 加载配置并构建注册表
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => ServiceConfig::from_file(path).map_err(GnError::from)?,
            None => {
                debug!("未指定配置文件，使用内置 CRS");
                ServiceConfig::default()
            }
        };
        let registry = Arc::new(config.build_registry().map_err(GnError::from)?);
        info!(crs = registry.len(), "CRS 注册表就绪");
        let builder = Arc::new(TransformBuilder::new(Arc::clone(&registry)));
        Ok(Self {
            config,
            registry,
            builder,
        })
    }
}
