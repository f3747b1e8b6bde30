// crates/gn_geo/src/geometry.rs
//! 几何类型与几何变换
//!
//! - [`Coordinate`]：二维坐标，可选 Z
//! - [`Shape`]：点、线串、多边形（首环为外环，其余为洞）
//! - [`Geometry`]：带 CRS 标签的形状
//!
//! 几何变换是纯映射：输入几何只借用不修改，输出为新几何，
//! 环的归属、顺序、洞的标记和坐标数量保持不变。任一坐标失败则整个几何失败。
//!
//! # 示例
//!
//! ```
//! use std::sync::Arc;
//! use gn_geo::crs::CrsRegistry;
//! use gn_geo::geometry::{transform_geometry, Geometry};
//! use gn_geo::transform::TransformBuilder;
//!
//! let builder = TransformBuilder::new(Arc::new(CrsRegistry::with_defaults()));
//! let t = builder.build(4326, 2855).unwrap();
//! let point = Geometry::point(4326, -122.33, 47.61);
//! let projected = transform_geometry(&t, &point).unwrap();
//! assert_eq!(projected.crs, 2855);
//! ```

use crate::crs::CrsId;
use crate::error::{GeoError, GeoResult};
use crate::transform::{TransformBuilder, Transformation};
use serde::{Deserialize, Serialize};

// ============================================================================
// Coordinate
// ============================================================================

/// 坐标
///
/// 地理坐标系下 x 为经度、y 为纬度 (度)；投影坐标系下为平面坐标。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// X / 经度
    pub x: f64,
    /// Y / 纬度
    pub y: f64,
    /// 高程（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Coordinate {
    /// 创建二维坐标
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// 创建带高程的坐标
    #[inline]
    #[must_use]
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// (x, y)
    #[inline]
    #[must_use]
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// 平面欧几里得距离（忽略 Z）
    #[inline]
    #[must_use]
    pub fn distance_2d(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// 所有分量是否为有限值
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.z {
            Some(z) => write!(f, "({}, {}, {})", self.x, self.y, z),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

// ============================================================================
// Shape / Geometry
// ============================================================================

/// 几何形状
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Shape {
    /// 点
    Point(Coordinate),
    /// 线串
    LineString(Vec<Coordinate>),
    /// 多边形：首环为外环，其余为洞
    Polygon(Vec<Vec<Coordinate>>),
}

impl Shape {
    fn map_coordinates<F>(&self, mut f: F) -> GeoResult<Self>
    where
        F: FnMut(Coordinate) -> GeoResult<Coordinate>,
    {
        Ok(match self {
            Self::Point(c) => Self::Point(f(*c)?),
            Self::LineString(line) => {
                Self::LineString(line.iter().map(|c| f(*c)).collect::<GeoResult<_>>()?)
            }
            Self::Polygon(rings) => Self::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|c| f(*c)).collect::<GeoResult<Vec<_>>>())
                    .collect::<GeoResult<_>>()?,
            ),
        })
    }

    /// 形状名称
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
        }
    }
}

/// 带 CRS 标签的几何
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// 坐标所在的 CRS
    pub crs: CrsId,
    /// 形状
    pub shape: Shape,
}

impl Geometry {
    /// 创建几何
    #[must_use]
    pub fn new(crs: CrsId, shape: Shape) -> Self {
        Self { crs, shape }
    }

    /// 点
    #[must_use]
    pub fn point(crs: CrsId, x: f64, y: f64) -> Self {
        Self::new(crs, Shape::Point(Coordinate::new(x, y)))
    }

    /// 线串
    #[must_use]
    pub fn line_string(crs: CrsId, coords: Vec<Coordinate>) -> Self {
        Self::new(crs, Shape::LineString(coords))
    }

    /// 多边形
    #[must_use]
    pub fn polygon(crs: CrsId, rings: Vec<Vec<Coordinate>>) -> Self {
        Self::new(crs, Shape::Polygon(rings))
    }

    /// 坐标总数
    #[must_use]
    pub fn coordinate_count(&self) -> usize {
        match &self.shape {
            Shape::Point(_) => 1,
            Shape::LineString(line) => line.len(),
            Shape::Polygon(rings) => rings.iter().map(Vec::len).sum(),
        }
    }

    /// 每个环的坐标数（非多边形返回空）
    #[must_use]
    pub fn ring_sizes(&self) -> Vec<usize> {
        match &self.shape {
            Shape::Polygon(rings) => rings.iter().map(Vec::len).collect(),
            _ => Vec::new(),
        }
    }

    /// 结构校验
    ///
    /// # Errors
    /// 坐标非有限值、线串少于 2 点、多边形无环、环少于 4 点或未闭合时返回
    /// [`GeoError::MalformedGeometry`]
    pub fn validate(&self) -> GeoResult<()> {
        match &self.shape {
            Shape::Point(c) => check_finite(std::slice::from_ref(c)),
            Shape::LineString(line) => {
                GeoError::ensure(
                    line.len() >= 2,
                    GeoError::malformed_geometry(format!(
                        "线串至少需要 2 个点, 实际 {}",
                        line.len()
                    )),
                )?;
                check_finite(line)
            }
            Shape::Polygon(rings) => {
                GeoError::ensure(!rings.is_empty(), GeoError::malformed_geometry("多边形没有环"))?;
                for (i, ring) in rings.iter().enumerate() {
                    GeoError::ensure(
                        ring.len() >= 4,
                        GeoError::malformed_geometry(format!(
                            "第 {i} 个环至少需要 4 个点, 实际 {}",
                            ring.len()
                        )),
                    )?;
                    check_finite(ring)?;
                    GeoError::ensure(
                        ring.first().map(Coordinate::xy) == ring.last().map(Coordinate::xy),
                        GeoError::malformed_geometry(format!("第 {i} 个环未闭合")),
                    )?;
                }
                Ok(())
            }
        }
    }

    /// 投影到目标 CRS
    ///
    /// 通过构建器取得（或复用缓存的）变换后调用 [`transform_geometry`]。
    ///
    /// # Errors
    /// 变换无法构建或任一坐标转换失败
    pub fn project_to(&self, builder: &TransformBuilder, target: CrsId) -> GeoResult<Self> {
        let transformation = builder.build(self.crs, target)?;
        transform_geometry(&transformation, self)
    }
}

fn check_finite(coords: &[Coordinate]) -> GeoResult<()> {
    match coords.iter().position(|c| !c.is_finite()) {
        Some(i) => Err(GeoError::malformed_geometry(format!(
            "第 {i} 个坐标不是有限值: {}",
            coords[i]
        ))),
        None => Ok(()),
    }
}

// ============================================================================
// 几何变换
// ============================================================================

/// 将变换应用到几何的每个坐标
///
/// 结果标记为变换的目标 CRS。Z 值原样传递（基准转换时为椭球高）。
///
/// # Errors
/// - 几何结构不合法：[`GeoError::MalformedGeometry`]
/// - 几何 CRS 与变换源不一致：[`GeoError::CrsMismatch`]
/// - 任一坐标转换失败：[`GeoError::ProjectionFailed`]
pub fn transform_geometry(
    transformation: &Transformation,
    geometry: &Geometry,
) -> GeoResult<Geometry> {
    geometry.validate()?;
    if geometry.crs != transformation.source() {
        return Err(GeoError::crs_mismatch(transformation.source(), geometry.crs));
    }
    let shape = geometry
        .shape
        .map_coordinates(|c| transformation.apply(c))?;
    Ok(Geometry::new(transformation.target(), shape))
}

// ============================================================================
// 平面距离
// ============================================================================

/// 点到线段的距离
fn point_segment_distance(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance_2d(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    (p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}

/// 点到折线的最小距离
fn point_polyline_distance(p: &Coordinate, line: &[Coordinate]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => p.distance_2d(only),
        _ => line
            .windows(2)
            .map(|w| point_segment_distance(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// 射线法判断点是否在环内
fn ring_contains(ring: &[Coordinate], p: &Coordinate) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// 点到形状的平面距离
///
/// - 点：欧几里得距离
/// - 线串：到各线段的最小距离
/// - 多边形：点在外环内且不在洞内时为 0，否则为到各环边界的最小距离
#[must_use]
pub fn point_to_shape_distance(point: &Coordinate, shape: &Shape) -> f64 {
    match shape {
        Shape::Point(c) => point.distance_2d(c),
        Shape::LineString(line) => point_polyline_distance(point, line),
        Shape::Polygon(rings) => {
            let Some((outer, holes)) = rings.split_first() else {
                return f64::INFINITY;
            };
            if ring_contains(outer, point) && !holes.iter().any(|h| ring_contains(h, point)) {
                return 0.0;
            }
            rings
                .iter()
                .map(|ring| point_polyline_distance(point, ring))
                .fold(f64::INFINITY, f64::min)
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
