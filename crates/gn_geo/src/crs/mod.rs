// crates/gn_geo/src/crs/mod.rs
//! 坐标参考系统 (CRS) 定义
//!
//! 每个 CRS 由整数标识和一组结构化参数组成：
//!
//! - 地理坐标系：椭球体、本初子午线、可选的到 WGS84 七参数
//! - 投影坐标系：基准地理坐标系标识、投影方法和投影参数
//!
//! 定义可以在代码中构造、从 JSON 反序列化，或通过 [`wkt`] 从 WKT 解析，
//! 再交给 [`registry::CrsRegistry`] 统一管理。
//!
//! # 示例
//!
//! ```
//! use gn_geo::crs::{CrsDefinition, CrsKind};
//!
//! let wgs84 = CrsDefinition::wgs84();
//! assert_eq!(wgs84.id(), 4326);
//! assert_eq!(wgs84.kind(), CrsKind::Geographic);
//!
//! let wa_north = CrsDefinition::washington_north();
//! assert!(wa_north.is_projected());
//! ```

pub mod registry;
pub mod wkt;

pub use registry::{CrsRegistry, CrsRegistryBuilder};
pub use wkt::{parse_wkt, WktCrs};

use crate::ellipsoid::Ellipsoid;
use serde::{Deserialize, Serialize};

/// CRS 标识（整数代码，通常为 EPSG 代码）
pub type CrsId = u32;

/// WGS84 地理坐标系
pub const WGS84_ID: CrsId = 4326;
/// NAD83(HARN) 地理坐标系
pub const NAD83_HARN_ID: CrsId = 4152;
/// NAD83(HARN) / Washington North 投影坐标系
pub const WASHINGTON_NORTH_ID: CrsId = 2855;

// ============================================================================
// CRS 类型
// ============================================================================

/// CRS 类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsKind {
    /// 地理坐标系（经纬度，度）
    Geographic,
    /// 投影坐标系（平面坐标，线性单位）
    Projected,
}

impl std::fmt::Display for CrsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geographic => write!(f, "geographic"),
            Self::Projected => write!(f, "projected"),
        }
    }
}

/// 七参数基准转换（位置矢量约定）
///
/// 平移单位为米，旋转单位为角秒，尺度单位为 ppm。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HelmertParams {
    /// X 平移 (m)
    pub dx: f64,
    /// Y 平移 (m)
    pub dy: f64,
    /// Z 平移 (m)
    pub dz: f64,
    /// X 旋转 (角秒)
    #[serde(default)]
    pub rx: f64,
    /// Y 旋转 (角秒)
    #[serde(default)]
    pub ry: f64,
    /// Z 旋转 (角秒)
    #[serde(default)]
    pub rz: f64,
    /// 尺度差 (ppm)
    #[serde(default)]
    pub ds: f64,
}

impl HelmertParams {
    /// 仅平移的三参数
    #[must_use]
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            dx,
            dy,
            dz,
            ..Self::default()
        }
    }

    /// 所有参数是否为零
    #[must_use]
    pub fn is_zero(&self) -> bool {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz, self.ds]
            .iter()
            .all(|v| *v == 0.0)
    }
}

/// 地理坐标系参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicParams {
    /// 名称
    pub name: String,
    /// 椭球体
    pub ellipsoid: Ellipsoid,
    /// 本初子午线相对 Greenwich 的经度 (度，东为正)
    #[serde(default)]
    pub prime_meridian: f64,
    /// 到 WGS84 的七参数（无则视为零参数）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_wgs84: Option<HelmertParams>,
}

/// 投影方法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMethod {
    /// 双标准纬线兰伯特等角圆锥投影
    LambertConformalConic2Sp,
    /// 单标准纬线兰伯特等角圆锥投影（带比例因子）
    LambertConformalConic1Sp,
    /// 其他投影方法（保留原始名称，构建变换时报告为不支持）
    Other(String),
}

impl ProjectionMethod {
    /// 从 WKT `PROJECTION` 名称解析
    #[must_use]
    pub fn from_wkt_name(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "lambert_conformal_conic_2sp"
            | "lambert_conformal_conic"
            | "lambert_conic_conformal_(2sp)" => Self::LambertConformalConic2Sp,
            "lambert_conformal_conic_1sp" | "lambert_conic_conformal_(1sp)" => {
                Self::LambertConformalConic1Sp
            }
            _ => Self::Other(name.trim().to_string()),
        }
    }

    /// 方法名称（WKT 写法）
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::LambertConformalConic2Sp => "Lambert_Conformal_Conic_2SP",
            Self::LambertConformalConic1Sp => "Lambert_Conformal_Conic_1SP",
            Self::Other(name) => name,
        }
    }

    /// 是否有已实现的投影公式
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// 线性单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearUnit {
    /// 单位名称
    pub name: String,
    /// 每单位对应的米数
    pub metres_per_unit: f64,
}

impl LinearUnit {
    /// 米
    #[must_use]
    pub fn metre() -> Self {
        Self {
            name: "metre".into(),
            metres_per_unit: 1.0,
        }
    }

    /// 美国测量英尺
    #[must_use]
    pub fn us_survey_foot() -> Self {
        Self {
            name: "US survey foot".into(),
            metres_per_unit: 1200.0 / 3937.0,
        }
    }

    /// 国际英尺
    #[must_use]
    pub fn foot() -> Self {
        Self {
            name: "foot".into(),
            metres_per_unit: 0.3048,
        }
    }
}

impl Default for LinearUnit {
    fn default() -> Self {
        Self::metre()
    }
}

fn default_scale_factor() -> f64 {
    1.0
}

/// 投影坐标系参数
///
/// 角度参数单位为度，假东/假北单位为 `linear_unit`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedParams {
    /// 名称
    pub name: String,
    /// 基准地理坐标系标识
    pub base: CrsId,
    /// 投影方法
    pub method: ProjectionMethod,
    /// 第一标准纬线
    #[serde(default)]
    pub standard_parallel_1: f64,
    /// 第二标准纬线
    #[serde(default)]
    pub standard_parallel_2: f64,
    /// 原点纬度
    #[serde(default)]
    pub latitude_of_origin: f64,
    /// 中央子午线
    #[serde(default)]
    pub central_meridian: f64,
    /// 比例因子（仅 1SP 使用）
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    /// 假东
    #[serde(default)]
    pub false_easting: f64,
    /// 假北
    #[serde(default)]
    pub false_northing: f64,
    /// 线性单位
    #[serde(default)]
    pub linear_unit: LinearUnit,
}

// ============================================================================
// CRS 定义
// ============================================================================

/// CRS 定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CrsDefinition {
    /// 地理坐标系
    Geographic {
        /// 标识
        id: CrsId,
        /// 参数
        params: GeographicParams,
    },
    /// 投影坐标系
    Projected {
        /// 标识
        id: CrsId,
        /// 参数
        params: ProjectedParams,
    },
}

impl CrsDefinition {
    /// 创建地理坐标系定义
    #[must_use]
    pub fn geographic(id: CrsId, params: GeographicParams) -> Self {
        Self::Geographic { id, params }
    }

    /// 创建投影坐标系定义
    #[must_use]
    pub fn projected(id: CrsId, params: ProjectedParams) -> Self {
        Self::Projected { id, params }
    }

    /// WGS84 地理坐标系 (EPSG:4326)
    #[must_use]
    pub fn wgs84() -> Self {
        Self::geographic(
            WGS84_ID,
            GeographicParams {
                name: "WGS 84".into(),
                ellipsoid: Ellipsoid::WGS84,
                prime_meridian: 0.0,
                to_wgs84: None,
            },
        )
    }

    /// NAD83(HARN) 地理坐标系 (EPSG:4152)
    #[must_use]
    pub fn nad83_harn() -> Self {
        Self::geographic(
            NAD83_HARN_ID,
            GeographicParams {
                name: "NAD83(HARN)".into(),
                ellipsoid: Ellipsoid::GRS80,
                prime_meridian: 0.0,
                to_wgs84: None,
            },
        )
    }

    /// NAD83(HARN) / Washington North (EPSG:2855)
    ///
    /// 覆盖华盛顿州北部的双标准纬线兰伯特投影，单位为米。
    #[must_use]
    pub fn washington_north() -> Self {
        Self::projected(
            WASHINGTON_NORTH_ID,
            ProjectedParams {
                name: "NAD83(HARN) / Washington North".into(),
                base: NAD83_HARN_ID,
                method: ProjectionMethod::LambertConformalConic2Sp,
                standard_parallel_1: 48.733_333_333_333_33,
                standard_parallel_2: 47.5,
                latitude_of_origin: 47.0,
                central_meridian: -120.833_333_333_333_3,
                scale_factor: 1.0,
                false_easting: 500_000.0,
                false_northing: 0.0,
                linear_unit: LinearUnit::metre(),
            },
        )
    }

    /// 标识
    #[must_use]
    pub fn id(&self) -> CrsId {
        match self {
            Self::Geographic { id, .. } | Self::Projected { id, .. } => *id,
        }
    }

    /// 名称
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Geographic { params, .. } => &params.name,
            Self::Projected { params, .. } => &params.name,
        }
    }

    /// 类别
    #[must_use]
    pub fn kind(&self) -> CrsKind {
        match self {
            Self::Geographic { .. } => CrsKind::Geographic,
            Self::Projected { .. } => CrsKind::Projected,
        }
    }

    /// 是否为地理坐标系
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.kind() == CrsKind::Geographic
    }

    /// 是否为投影坐标系
    #[must_use]
    pub fn is_projected(&self) -> bool {
        self.kind() == CrsKind::Projected
    }

    /// 单位名称
    #[must_use]
    pub fn unit_name(&self) -> &str {
        match self {
            Self::Geographic { .. } => "degree",
            Self::Projected { params, .. } => &params.linear_unit.name,
        }
    }
}

impl std::fmt::Display for CrsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] ({})", self.id(), self.name(), self.kind())
    }
}

// ============================================================================
// 测试
// ============================================================================
