// crates/gn_geo/src/projection/mod.rs
//! 纯 Rust 实现的地图投影
//!
//! 支持的投影方法：
//! - 双标准纬线兰伯特等角圆锥投影 (Lambert Conformal Conic 2SP)
//! - 单标准纬线兰伯特等角圆锥投影 (Lambert Conformal Conic 1SP)
//!
//! 投影常数在构造时一次性计算，之后的正/逆向转换只做逐点运算。
//!
//! # 示例
//!
//! ```
//! use gn_geo::crs::CrsDefinition;
//! use gn_geo::ellipsoid::Ellipsoid;
//! use gn_geo::projection::{LambertConformalConic, MapProjection};
//!
//! let CrsDefinition::Projected { id, params } = CrsDefinition::washington_north() else {
//!     unreachable!()
//! };
//! let lcc = LambertConformalConic::new(id, &params, Ellipsoid::GRS80).unwrap();
//! let (x, y) = lcc.forward(-122.33, 47.61).unwrap();
//! let (lon, lat) = lcc.inverse(x, y).unwrap();
//! assert!((lon + 122.33).abs() < 1e-9 && (lat - 47.61).abs() < 1e-9);
//! ```

mod lambert;
pub mod math_utils;

pub use lambert::LambertConformalConic;

use crate::error::GeoResult;

/// 地图投影 Trait
///
/// 变换链中的投影步骤通过此 trait 调用
pub trait MapProjection: Send + Sync {
    /// 获取投影名称
    fn name(&self) -> &'static str;

    /// 正向投影：地理坐标 -> 平面坐标
    ///
    /// # Arguments
    /// - `lon`: 经度 (度)
    /// - `lat`: 纬度 (度)
    ///
    /// # Returns
    /// (x, y) 平面坐标（投影坐标系的线性单位）
    fn forward(&self, lon: f64, lat: f64) -> GeoResult<(f64, f64)>;

    /// 逆向投影：平面坐标 -> 地理坐标
    ///
    /// # Returns
    /// (lon, lat) 经度和纬度 (度)
    fn inverse(&self, x: f64, y: f64) -> GeoResult<(f64, f64)>;
}
