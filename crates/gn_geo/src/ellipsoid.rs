// crates/gn_geo/src/ellipsoid.rs
//! 椭球体定义
//!
//! 提供地球椭球体参数，支持 WGS84、GRS80、Clarke 1866 等标准椭球体。
//!
//! # 示例
//!
//! ```
//! use gn_geo::ellipsoid::Ellipsoid;
//!
//! let grs80 = Ellipsoid::from_inverse_flattening(6_378_137.0, 298.257_222_101);
//! assert!(grs80.same_shape(&Ellipsoid::GRS80));
//! ```

use serde::{Deserialize, Serialize};

/// 地球椭球体
///
/// 以长半轴和扁率定义，派生参数按需计算。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// 长半轴 (m)
    pub a: f64,
    /// 扁率 (flattening)，0 表示球体
    pub f: f64,
}

impl Ellipsoid {
    // ========================================================================
    // 预定义椭球体
    // ========================================================================

    /// WGS84 椭球体 (EPSG:7030)
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// GRS80 椭球体 (EPSG:7019)，NAD83 系列基准使用
    pub const GRS80: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// Clarke 1866 椭球体 (EPSG:7008)，NAD27 使用
    pub const CLARKE_1866: Self = Self {
        a: 6_378_206.4,
        f: 1.0 / 294.978_698_2,
    };

    // ========================================================================
    // 构造方法
    // ========================================================================

    /// 从长半轴和扁率创建椭球体
    #[must_use]
    pub const fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    /// 从长半轴和扁率倒数创建（WKT `SPHEROID` 的写法）
    ///
    /// 扁率倒数为 0 时按球体处理。
    #[must_use]
    pub fn from_inverse_flattening(a: f64, inverse_flattening: f64) -> Self {
        let f = if inverse_flattening == 0.0 {
            0.0
        } else {
            1.0 / inverse_flattening
        };
        Self { a, f }
    }

    // ========================================================================
    // 派生参数
    // ========================================================================

    /// 短半轴 b = a(1-f)
    #[inline]
    #[must_use]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// 扁率倒数（球体返回 0）
    #[inline]
    #[must_use]
    pub fn inverse_flattening(&self) -> f64 {
        if self.f == 0.0 {
            0.0
        } else {
            1.0 / self.f
        }
    }

    /// 第一偏心率的平方 e² = 2f - f²
    #[inline]
    #[must_use]
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// 第一偏心率 e = √e²
    #[inline]
    #[must_use]
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// 卯酉圈曲率半径（在纬度 φ 处）
    ///
    /// N = a / √(1-e²sin²φ)
    #[inline]
    #[must_use]
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let sin_lat = lat_rad.sin();
        self.a / (1.0 - self.e2() * sin_lat * sin_lat).sqrt()
    }

    /// 两个椭球体形状是否一致（相对容差 1e-12）
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        (self.a - other.a).abs() <= 1e-12 * self.a.abs().max(1.0)
            && (self.f - other.f).abs() <= 1e-12
    }

    /// 参数是否可用于投影计算
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.a.is_finite() && self.a > 0.0 && self.f.is_finite() && (0.0..1.0).contains(&self.f)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl std::fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ellipsoid(a={}, f=1/{:.9})", self.a, self.inverse_flattening())
    }
}

// ============================================================================
// 测试
// ============================================================================
