// crates/gn_geo/src/datum.rs
//! 大地坐标与地心坐标互换、七参数基准转换
//!
//! 地理坐标系之间的转换路线：
//!
//! ```text
//! (λ, φ, h)_A -> (X, Y, Z)_A -> WGS84 -> (X, Y, Z)_B -> (λ, φ, h)_B
//! ```
//!
//! 其中 A→WGS84 使用 A 的 `to_wgs84`，WGS84→B 使用 B 的 `to_wgs84` 的逆。

use crate::crs::{GeographicParams, HelmertParams};
use crate::ellipsoid::Ellipsoid;
use crate::projection::math_utils::{LATITUDE_TOLERANCE, MAX_ITERATIONS};

/// 角秒转弧度
const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// 大地坐标 → 地心直角坐标
///
/// `lon`、`lat` 为度，`h` 为椭球高 (m)，返回 (X, Y, Z) (m)。
#[must_use]
pub fn geodetic_to_geocentric(
    ellipsoid: &Ellipsoid,
    lon: f64,
    lat: f64,
    h: f64,
) -> (f64, f64, f64) {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    let n = ellipsoid.prime_vertical_radius(lat);
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    (
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - ellipsoid.e2()) + h) * sin_lat,
    )
}

/// 地心直角坐标 → 大地坐标
///
/// 以 Bowring 初值做不动点迭代，返回 (经度°, 纬度°, 椭球高 m)。
#[must_use]
pub fn geocentric_to_geodetic(ellipsoid: &Ellipsoid, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let e2 = ellipsoid.e2();
    let p = x.hypot(y);
    let lon = y.atan2(x);

    // 极轴上
    if p < 1e-9 {
        let lat = if z >= 0.0 { 90.0 } else { -90.0 };
        return (lon.to_degrees(), lat, z.abs() - ellipsoid.b());
    }

    let b = ellipsoid.b();
    let ep2 = (ellipsoid.a * ellipsoid.a - b * b) / (b * b);
    let u = (z * ellipsoid.a).atan2(p * b);
    let (sin_u, cos_u) = u.sin_cos();
    let mut lat = (z + ep2 * b * sin_u.powi(3)).atan2(p - e2 * ellipsoid.a * cos_u.powi(3));

    for _ in 0..MAX_ITERATIONS {
        let n = ellipsoid.prime_vertical_radius(lat);
        let h = p / lat.cos() - n;
        let next = z.atan2(p * (1.0 - e2 * n / (n + h)));
        let done = (next - lat).abs() < LATITUDE_TOLERANCE;
        lat = next;
        if done {
            break;
        }
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let h = p * cos_lat + z * sin_lat
        - ellipsoid.a * (1.0 - e2 * sin_lat * sin_lat).sqrt();
    (lon.to_degrees(), lat.to_degrees(), h)
}

impl HelmertParams {
    /// 正向七参数转换（位置矢量约定，小角度近似）
    #[must_use]
    pub fn apply(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let (rx, ry, rz) = self.rotation_radians();
        let s = 1.0 + self.ds * 1e-6;
        (
            self.dx + s * (x - rz * y + ry * z),
            self.dy + s * (rz * x + y - rx * z),
            self.dz + s * (-ry * x + rx * y + z),
        )
    }

    /// 逆向七参数转换
    #[must_use]
    pub fn apply_inverse(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let (rx, ry, rz) = self.rotation_radians();
        let s = 1.0 + self.ds * 1e-6;
        let (x, y, z) = (
            (x - self.dx) / s,
            (y - self.dy) / s,
            (z - self.dz) / s,
        );
        // 旋转矩阵的转置
        (
            x + rz * y - ry * z,
            -rz * x + y + rx * z,
            ry * x - rx * y + z,
        )
    }

    fn rotation_radians(&self) -> (f64, f64, f64) {
        (
            self.rx * ARCSEC_TO_RAD,
            self.ry * ARCSEC_TO_RAD,
            self.rz * ARCSEC_TO_RAD,
        )
    }
}

/// 两个地理坐标系之间的基准转换
///
/// 经度均相对 Greenwich。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatumShift {
    source: Ellipsoid,
    target: Ellipsoid,
    source_to_wgs84: HelmertParams,
    target_to_wgs84: HelmertParams,
}

impl DatumShift {
    /// 构造两个地理坐标系之间的基准转换
    ///
    /// 椭球体形状相同且到 WGS84 的参数相同时返回 `None`（无需转换）。
    ///
    /// 只比较形状与参数，不按名称把两个基准视为等同。WGS84 与 GRS80
    /// （如 4326 与 4152）没有七参数，但扁率不同，因此仍返回一次地心坐标
    /// 往返。该往返对经纬度与椭球高的影响都在亚毫米级，对平面距离而言
    /// 相当于恒等。
    #[must_use]
    pub fn between(source: &GeographicParams, target: &GeographicParams) -> Option<Self> {
        let source_to_wgs84 = source.to_wgs84.unwrap_or_default();
        let target_to_wgs84 = target.to_wgs84.unwrap_or_default();
        if source.ellipsoid.same_shape(&target.ellipsoid) && source_to_wgs84 == target_to_wgs84 {
            return None;
        }
        Some(Self {
            source: source.ellipsoid,
            target: target.ellipsoid,
            source_to_wgs84,
            target_to_wgs84,
        })
    }

    /// 转换一个大地坐标 (度, 度, m)
    #[must_use]
    pub fn apply(&self, lon: f64, lat: f64, h: f64) -> (f64, f64, f64) {
        let (x, y, z) = geodetic_to_geocentric(&self.source, lon, lat, h);
        let (x, y, z) = self.source_to_wgs84.apply(x, y, z);
        let (x, y, z) = self.target_to_wgs84.apply_inverse(x, y, z);
        geocentric_to_geodetic(&self.target, x, y, z)
    }
}

// ============================================================================
// 测试
// ============================================================================
