// crates/gn_geo/src/transform.rs
//! 坐标变换与变换构建器
//!
//! [`TransformBuilder`] 根据注册表中的定义推导 `(源, 目标)` 之间的
//! [`Transformation`]，并按有序对缓存。变换构建后不可变，以 `Arc` 在线程间共享。
//!
//! 推导出的步骤链：
//!
//! ```text
//! [逆投影] -> [本初子午线→Greenwich] -> [基准转换] -> [Greenwich→本初子午线] -> [投影]
//! ```
//!
//! # 示例
//!
//! ```
//! use std::sync::Arc;
//! use gn_geo::crs::CrsRegistry;
//! use gn_geo::geometry::Coordinate;
//! use gn_geo::transform::TransformBuilder;
//!
//! let builder = TransformBuilder::new(Arc::new(CrsRegistry::with_defaults()));
//! let t = builder.build(4326, 2855).unwrap();
//! let xy = t.apply(Coordinate::new(-122.33, 47.61)).unwrap();
//! assert!((xy.x - 387_480.7).abs() < 1.0);
//!
//! // 同一有序对返回同一个实例
//! assert!(Arc::ptr_eq(&t, &builder.build(4326, 2855).unwrap()));
//! ```

use crate::crs::{CrsDefinition, CrsId, CrsRegistry};
use crate::datum::DatumShift;
use crate::error::GeoResult;
use crate::geometry::Coordinate;
use crate::projection::math_utils::normalize_longitude;
use crate::projection::{LambertConformalConic, MapProjection};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// Transformation
// ============================================================================

/// 单个变换步骤
#[derive(Debug, Clone)]
enum TransformStep {
    /// 平面坐标 → 基准地理坐标
    Unproject(LambertConformalConic),
    /// 经度由本初子午线改为相对 Greenwich
    FromPrimeMeridian { offset: f64 },
    /// 地理坐标系之间的基准转换
    DatumShift(DatumShift),
    /// 经度由 Greenwich 改为相对本初子午线
    ToPrimeMeridian { offset: f64 },
    /// 基准地理坐标 → 平面坐标
    Project(LambertConformalConic),
}

impl TransformStep {
    fn apply(&self, c: Coordinate) -> GeoResult<Coordinate> {
        Ok(match self {
            Self::Unproject(proj) => {
                let (lon, lat) = proj.inverse(c.x, c.y)?;
                Coordinate { x: lon, y: lat, z: c.z }
            }
            Self::Project(proj) => {
                let (x, y) = proj.forward(c.x, c.y)?;
                Coordinate { x, y, z: c.z }
            }
            Self::FromPrimeMeridian { offset } => Coordinate {
                x: normalize_longitude(c.x + offset),
                ..c
            },
            Self::ToPrimeMeridian { offset } => Coordinate {
                x: normalize_longitude(c.x - offset),
                ..c
            },
            Self::DatumShift(shift) => {
                let (lon, lat, h) = shift.apply(c.x, c.y, c.z.unwrap_or(0.0));
                Coordinate {
                    x: lon,
                    y: lat,
                    z: c.z.map(|_| h),
                }
            }
        })
    }
}

/// 两个 CRS 之间的坐标变换
///
/// 不可变的纯函数，可在任意线程并发调用。
#[derive(Debug, Clone)]
pub struct Transformation {
    source: CrsId,
    target: CrsId,
    steps: Vec<TransformStep>,
}

impl Transformation {
    /// 源 CRS
    #[must_use]
    pub fn source(&self) -> CrsId {
        self.source
    }

    /// 目标 CRS
    #[must_use]
    pub fn target(&self) -> CrsId {
        self.target
    }

    /// 是否为恒等变换
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// 步骤数
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// 变换单个坐标
    ///
    /// # Errors
    /// 任一步骤失败时返回 [`GeoError::ProjectionFailed`](crate::error::GeoError::ProjectionFailed)
    pub fn apply(&self, coord: Coordinate) -> GeoResult<Coordinate> {
        self.steps.iter().try_fold(coord, |c, step| step.apply(c))
    }
}

// ============================================================================
// TransformBuilder
// ============================================================================

/// 带缓存的变换构建器
///
/// 缓存按 `(源, 目标)` 有序对存放，不淘汰。同一有序对最多推导一次，
/// 所有调用方拿到同一个 `Arc<Transformation>`。推导失败不缓存。
#[derive(Debug)]
pub struct TransformBuilder {
    registry: Arc<CrsRegistry>,
    cache: RwLock<HashMap<(CrsId, CrsId), Arc<Transformation>>>,
}

impl TransformBuilder {
    /// 创建构建器
    #[must_use]
    pub fn new(registry: Arc<CrsRegistry>) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 使用的注册表
    #[must_use]
    pub fn registry(&self) -> &Arc<CrsRegistry> {
        &self.registry
    }

    /// 已缓存的变换数量
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    /// 取得 `source → target` 的变换
    ///
    /// # Errors
    /// - 任一标识未注册：[`GeoError::UnknownCrs`]
    /// - 投影方法未实现：[`GeoError::UnsupportedProjection`]
    /// - 定义无效：[`GeoError::InvalidDefinition`]
    ///
    /// [`GeoError::UnknownCrs`]: crate::error::GeoError::UnknownCrs
    /// [`GeoError::UnsupportedProjection`]: crate::error::GeoError::UnsupportedProjection
    /// [`GeoError::InvalidDefinition`]: crate::error::GeoError::InvalidDefinition
    pub fn build(&self, source: CrsId, target: CrsId) -> GeoResult<Arc<Transformation>> {
        let key = (source, target);
        if let Some(t) = self.cache.read().get(&key) {
            trace!(source, target, "变换缓存命中");
            return Ok(Arc::clone(t));
        }

        // 可升级读锁同一时刻只有一个持有者，推导因此串行
        let guard = self.cache.upgradable_read();
        if let Some(t) = guard.get(&key) {
            return Ok(Arc::clone(t));
        }
        let transformation = Arc::new(self.derive(source, target)?);
        debug!(
            source,
            target,
            steps = transformation.step_count(),
            "推导坐标变换"
        );
        let mut cache = RwLockUpgradableReadGuard::upgrade(guard);
        cache.insert(key, Arc::clone(&transformation));
        Ok(transformation)
    }

    fn derive(&self, source: CrsId, target: CrsId) -> GeoResult<Transformation> {
        let source_def = self.registry.lookup(source)?;
        let target_def = self.registry.lookup(target)?;

        let mut steps = Vec::new();
        if source != target {
            let (_, source_geo) = self.registry.lookup_geographic(source)?;
            let (_, target_geo) = self.registry.lookup_geographic(target)?;

            if let CrsDefinition::Projected { id, params } = source_def {
                let projection = LambertConformalConic::new(*id, params, source_geo.ellipsoid)?;
                trace!(crs = *id, method = projection.name(), "逆投影步骤");
                steps.push(TransformStep::Unproject(projection));
            }
            if source_geo.prime_meridian != 0.0 {
                steps.push(TransformStep::FromPrimeMeridian {
                    offset: source_geo.prime_meridian,
                });
            }
            if let Some(shift) = DatumShift::between(source_geo, target_geo) {
                steps.push(TransformStep::DatumShift(shift));
            }
            if target_geo.prime_meridian != 0.0 {
                steps.push(TransformStep::ToPrimeMeridian {
                    offset: target_geo.prime_meridian,
                });
            }
            if let CrsDefinition::Projected { id, params } = target_def {
                let projection = LambertConformalConic::new(*id, params, target_geo.ellipsoid)?;
                trace!(crs = *id, method = projection.name(), "正投影步骤");
                steps.push(TransformStep::Project(projection));
            }
        }

        Ok(Transformation {
            source,
            target,
            steps,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{
        GeographicParams, ProjectionMethod, NAD83_HARN_ID, WASHINGTON_NORTH_ID, WGS84_ID,
    };
    use crate::ellipsoid::Ellipsoid;
    use crate::error::GeoError;
    use approx::assert_abs_diff_eq;

    fn builder() -> TransformBuilder {
        TransformBuilder::new(Arc::new(CrsRegistry::with_defaults()))
    }

    #[test]
    fn test_identity() {
        let b = builder();
        for id in [WGS84_ID, WASHINGTON_NORTH_ID] {
            let t = b.build(id, id).expect("identity");
            assert!(t.is_identity());
            let c = Coordinate::with_z(1.5, 2.5, 3.5);
            assert_eq!(t.apply(c).expect("apply"), c);
        }
        assert_eq!(b.build(9999, 9999).unwrap_err(), GeoError::unknown_crs(9999));
    }

    #[test]
    fn test_unknown_crs() {
        let b = builder();
        assert_eq!(b.build(9999, WGS84_ID).unwrap_err(), GeoError::unknown_crs(9999));
        assert_eq!(b.build(WGS84_ID, 8888).unwrap_err(), GeoError::unknown_crs(8888));
        assert_eq!(b.cached_len(), 0, "失败不缓存");
    }

    #[test]
    fn test_wgs84_to_washington_north() {
        let t = builder().build(WGS84_ID, WASHINGTON_NORTH_ID).expect("build");
        assert_eq!(t.source(), WGS84_ID);
        assert_eq!(t.target(), WASHINGTON_NORTH_ID);
        // 基准转换 + 投影
        assert_eq!(t.step_count(), 2);

        let xy = t.apply(Coordinate::new(-122.33, 47.61)).expect("apply");
        assert_abs_diff_eq!(xy.x, 387_480.74, epsilon = 0.05);
        assert_abs_diff_eq!(xy.y, 68_915.19, epsilon = 0.05);
        assert!(xy.z.is_none());
    }

    #[test]
    fn test_roundtrip() {
        let b = builder();
        let forward = b.build(WGS84_ID, WASHINGTON_NORTH_ID).expect("forward");
        let inverse = b.build(WASHINGTON_NORTH_ID, WGS84_ID).expect("inverse");
        for (lon, lat) in [(-122.33, 47.61), (-120.0, 46.0), (-117.5, 49.0)] {
            let xy = forward.apply(Coordinate::new(lon, lat)).expect("forward");
            let back = inverse.apply(xy).expect("inverse");
            assert_abs_diff_eq!(back.x, lon, epsilon = 1e-9);
            assert_abs_diff_eq!(back.y, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_same_base_needs_no_datum_shift() {
        let t = builder().build(NAD83_HARN_ID, WASHINGTON_NORTH_ID).expect("build");
        assert_eq!(t.step_count(), 1);
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let b = builder();
        let t1 = b.build(WGS84_ID, WASHINGTON_NORTH_ID).expect("t1");
        let t2 = b.build(WGS84_ID, WASHINGTON_NORTH_ID).expect("t2");
        assert!(Arc::ptr_eq(&t1, &t2));
        assert_eq!(b.cached_len(), 1);

        // 有序对：反方向是另一个条目
        b.build(WASHINGTON_NORTH_ID, WGS84_ID).expect("reverse");
        assert_eq!(b.cached_len(), 2);
    }

    #[test]
    fn test_unsupported_method_reported_at_build() {
        let mut def = CrsDefinition::washington_north();
        if let CrsDefinition::Projected { id, params } = &mut def {
            *id = 32610;
            params.method = ProjectionMethod::Other("Transverse_Mercator".into());
        }
        let registry = CrsRegistry::builder()
            .register(CrsDefinition::wgs84())
            .register(CrsDefinition::nad83_harn())
            .register(def)
            .build()
            .expect("registry");
        let b = TransformBuilder::new(Arc::new(registry));
        match b.build(WGS84_ID, 32610) {
            Err(GeoError::UnsupportedProjection { id, method }) => {
                assert_eq!(id, 32610);
                assert_eq!(method, "Transverse_Mercator");
            }
            other => panic!("错误的错误类型: {other:?}"),
        }
    }

    #[test]
    fn test_prime_meridian_steps() {
        // 以巴黎为本初子午线的地理坐标系
        let paris = CrsDefinition::geographic(
            9807,
            GeographicParams {
                name: "WGS84 Paris".into(),
                ellipsoid: Ellipsoid::WGS84,
                prime_meridian: 2.337_229_166_7,
                to_wgs84: None,
            },
        );
        let registry = CrsRegistry::builder()
            .register(CrsDefinition::wgs84())
            .register(paris)
            .build()
            .expect("registry");
        let b = TransformBuilder::new(Arc::new(registry));

        let t = b.build(9807, WGS84_ID).expect("build");
        assert_eq!(t.step_count(), 1);
        let c = t.apply(Coordinate::new(0.0, 48.8)).expect("apply");
        assert_abs_diff_eq!(c.x, 2.337_229_166_7, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 48.8);

        let back = b.build(WGS84_ID, 9807).expect("build").apply(c).expect("apply");
        assert_abs_diff_eq!(back.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_failure_is_reported() {
        let t = builder().build(WGS84_ID, WASHINGTON_NORTH_ID).expect("build");
        assert!(matches!(
            t.apply(Coordinate::new(f64::NAN, 47.0)),
            Err(GeoError::ProjectionFailed { .. })
        ));
    }
}
