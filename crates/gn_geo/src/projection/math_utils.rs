// crates/gn_geo/src/projection/math_utils.rs
//! 等角投影公共数学函数

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// 共形纬度迭代的收敛容差 (弧度)
pub const LATITUDE_TOLERANCE: f64 = 1e-12;

/// 共形纬度迭代的最大次数
pub const MAX_ITERATIONS: usize = 15;

/// m = cos φ / √(1 − e² sin² φ)
#[inline]
pub fn conformal_m(lat_rad: f64, e: f64) -> f64 {
    let sin_lat = lat_rad.sin();
    lat_rad.cos() / (1.0 - e * e * sin_lat * sin_lat).sqrt()
}

/// t = tan(π/4 − φ/2) / ((1 − e sin φ)/(1 + e sin φ))^(e/2)
#[inline]
pub fn conformal_t(lat_rad: f64, e: f64) -> f64 {
    let e_sin = e * lat_rad.sin();
    (FRAC_PI_4 - lat_rad / 2.0).tan() / ((1.0 - e_sin) / (1.0 + e_sin)).powf(e / 2.0)
}

/// 由 t 反求纬度（不动点迭代）
///
/// 未在 [`MAX_ITERATIONS`] 次内收敛时返回 `None`
pub fn latitude_from_t(t: f64, e: f64) -> Option<f64> {
    let mut lat = FRAC_PI_2 - 2.0 * t.atan();
    for _ in 0..MAX_ITERATIONS {
        let e_sin = e * lat.sin();
        let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - e_sin) / (1.0 + e_sin)).powf(e / 2.0)).atan();
        if (next - lat).abs() < LATITUDE_TOLERANCE {
            return Some(next);
        }
        lat = next;
    }
    None
}

/// 弧度归一化到 [-π, π]
#[inline]
pub fn normalize_radians(x: f64) -> f64 {
    let mut x = x % (2.0 * PI);
    if x > PI {
        x -= 2.0 * PI;
    } else if x < -PI {
        x += 2.0 * PI;
    }
    x
}

/// 角度归一化到 [-180, 180]
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    let mut x = lon % 360.0;
    if x > 180.0 {
        x -= 360.0;
    } else if x < -180.0 {
        x += 360.0;
    }
    x
}
