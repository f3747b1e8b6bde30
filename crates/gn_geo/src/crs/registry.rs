// crates/gn_geo/src/crs/registry.rs
//! CRS 注册表
//!
//! 进程启动时构建、之后只读的 `CrsId -> CrsDefinition` 表。
//! 其他组件只通过 [`CrsRegistry::lookup`] 访问定义，不依赖任何写死的标识列表，
//! 新增坐标系只需要修改配置。
//!
//! # 示例
//!
//! ```
//! use gn_geo::crs::{CrsDefinition, CrsRegistry};
//!
//! let registry = CrsRegistry::builder()
//!     .register(CrsDefinition::wgs84())
//!     .build()
//!     .unwrap();
//! assert!(registry.lookup(4326).is_ok());
//! assert!(registry.lookup(9999).is_err());
//! ```

use super::{CrsDefinition, CrsId, GeographicParams, ProjectionMethod};
use crate::error::{GeoError, GeoResult};
use crate::projection::LambertConformalConic;
use std::collections::BTreeMap;
use tracing::debug;

/// CRS 注册表
///
/// 构建后不可变，可通过 `Arc` 在任意线程间无锁共享。
#[derive(Debug, Clone)]
pub struct CrsRegistry {
    definitions: BTreeMap<CrsId, CrsDefinition>,
}

impl CrsRegistry {
    /// 创建注册表构建器
    #[must_use]
    pub fn builder() -> CrsRegistryBuilder {
        CrsRegistryBuilder::default()
    }

    /// 内置注册表：WGS84 (4326)、NAD83(HARN) (4152)、Washington North (2855)
    #[must_use]
    pub fn with_defaults() -> Self {
        let definitions = [
            CrsDefinition::wgs84(),
            CrsDefinition::nad83_harn(),
            CrsDefinition::washington_north(),
        ]
        .into_iter()
        .map(|def| (def.id(), def))
        .collect();
        Self { definitions }
    }

    /// 按标识查找定义
    ///
    /// # Errors
    /// 标识未注册时返回 [`GeoError::UnknownCrs`]
    pub fn lookup(&self, id: CrsId) -> GeoResult<&CrsDefinition> {
        self.definitions
            .get(&id)
            .ok_or_else(|| GeoError::unknown_crs(id))
    }

    /// 解析 CRS 所依托的地理坐标系
    ///
    /// 地理坐标系返回自身；投影坐标系返回其基准地理坐标系。
    ///
    /// # Errors
    /// 标识或基准未注册时返回 [`GeoError::UnknownCrs`]；
    /// 基准不是地理坐标系时返回 [`GeoError::InvalidDefinition`]
    pub fn lookup_geographic(&self, id: CrsId) -> GeoResult<(CrsId, &GeographicParams)> {
        match self.lookup(id)? {
            CrsDefinition::Geographic { params, .. } => Ok((id, params)),
            CrsDefinition::Projected { params, .. } => match self.lookup(params.base)? {
                CrsDefinition::Geographic { params: base, .. } => Ok((params.base, base)),
                CrsDefinition::Projected { .. } => Err(GeoError::invalid_definition(
                    id,
                    format!("基准 CRS {} 不是地理坐标系", params.base),
                )),
            },
        }
    }

    /// 是否包含标识
    #[must_use]
    pub fn contains(&self, id: CrsId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// 所有已注册标识（升序）
    pub fn ids(&self) -> impl Iterator<Item = CrsId> + '_ {
        self.definitions.keys().copied()
    }

    /// 所有定义（按标识升序）
    pub fn definitions(&self) -> impl Iterator<Item = &CrsDefinition> {
        self.definitions.values()
    }

    /// 定义数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for CrsRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// 构建器
// ============================================================================

/// 注册表构建器
///
/// 收集定义，在 [`build`](Self::build) 时统一校验。
#[derive(Debug, Default)]
pub struct CrsRegistryBuilder {
    definitions: Vec<CrsDefinition>,
}

impl CrsRegistryBuilder {
    /// 登记一个定义
    #[must_use]
    pub fn register(mut self, definition: CrsDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 登记多个定义
    #[must_use]
    pub fn register_all(mut self, definitions: impl IntoIterator<Item = CrsDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// 从 WKT 登记定义
    ///
    /// `PROJCS` 内嵌的 `GEOGCS` 会一并登记为基准地理坐标系。
    ///
    /// # Errors
    /// WKT 无法解析时返回错误
    pub fn register_wkt(mut self, wkt: &str, id_hint: Option<CrsId>) -> GeoResult<Self> {
        let parsed = super::wkt::parse_wkt(wkt, id_hint)?;
        if let Some(base) = parsed.base {
            self.definitions.push(base);
        }
        self.definitions.push(parsed.definition);
        Ok(self)
    }

    /// 校验并构建注册表
    ///
    /// # Errors
    /// - 同一标识登记了不同定义
    /// - 投影坐标系的基准未注册或不是地理坐标系
    /// - 椭球体或投影参数无效
    pub fn build(self) -> GeoResult<CrsRegistry> {
        let mut definitions: BTreeMap<CrsId, CrsDefinition> = BTreeMap::new();
        for def in self.definitions {
            let id = def.id();
            match definitions.get(&id) {
                Some(existing) if *existing == def => {
                    debug!(crs = id, "忽略重复登记的相同定义");
                }
                Some(_) => {
                    return Err(GeoError::invalid_definition(id, "同一标识登记了不同的定义"));
                }
                None => {
                    definitions.insert(id, def);
                }
            }
        }

        let registry = CrsRegistry { definitions };
        for def in registry.definitions() {
            validate_definition(&registry, def)?;
        }
        debug!(count = registry.len(), "CRS 注册表构建完成");
        Ok(registry)
    }
}

/// 校验单个定义在注册表中的一致性
fn validate_definition(registry: &CrsRegistry, def: &CrsDefinition) -> GeoResult<()> {
    match def {
        CrsDefinition::Geographic { id, params } => {
            GeoError::ensure(
                params.ellipsoid.is_valid(),
                GeoError::invalid_definition(*id, format!("椭球体参数无效: {}", params.ellipsoid)),
            )?;
            GeoError::ensure(
                params.prime_meridian.is_finite() && params.prime_meridian.abs() <= 180.0,
                GeoError::invalid_definition(*id, "本初子午线经度无效"),
            )
        }
        CrsDefinition::Projected { id, params } => {
            let base = match registry.lookup(params.base) {
                Ok(CrsDefinition::Geographic { params: base, .. }) => base,
                Ok(CrsDefinition::Projected { .. }) => {
                    return Err(GeoError::invalid_definition(
                        *id,
                        format!("基准 CRS {} 不是地理坐标系", params.base),
                    ))
                }
                Err(_) => {
                    return Err(GeoError::invalid_definition(
                        *id,
                        format!("基准 CRS {} 未注册", params.base),
                    ))
                }
            };
            // 未实现的投影方法允许登记，构建变换时才报告
            if matches!(params.method, ProjectionMethod::Other(_)) {
                return Ok(());
            }
            LambertConformalConic::new(*id, params, base.ellipsoid).map(|_| ())
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
