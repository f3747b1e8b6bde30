// crates/gn_geo/src/lib.rs
//! GeoNear 地理空间处理模块
//!
//! 提供坐标参考系统 (CRS) 注册表、投影、基准转换与几何变换。
//!
//! # 模块
//!
//! - `crs`: CRS 定义、WKT 解析与注册表
//! - `ellipsoid`: 参考椭球体
//! - `projection`: 兰伯特等角圆锥投影
//! - `datum`: 地心坐标与七参数基准转换
//! - `transform`: 坐标变换与带缓存的构建器
//! - `geometry`: 几何类型、几何变换与平面距离
//!
//! # 示例
//!
//! ```
//! use gn_geo::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(CrsRegistry::with_defaults());
//! let builder = TransformBuilder::new(registry);
//!
//! // WGS84 -> NAD83(HARN) / Washington North
//! let seattle = Geometry::point(4326, -122.33, 47.61);
//! let projected = seattle.project_to(&builder, 2855).unwrap();
//! assert_eq!(projected.crs, 2855);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]

pub mod crs;
pub mod datum;
pub mod ellipsoid;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod transform;

/// 预导入模块
pub mod prelude {
    pub use crate::crs::{CrsDefinition, CrsId, CrsKind, CrsRegistry};
    pub use crate::ellipsoid::Ellipsoid;
    pub use crate::error::{GeoError, GeoResult};
    pub use crate::geometry::{
        point_to_shape_distance, transform_geometry, Coordinate, Geometry, Shape,
    };
    pub use crate::projection::{LambertConformalConic, MapProjection};
    pub use crate::transform::{TransformBuilder, Transformation};
}

// 重导出常用类型
pub use crs::{CrsDefinition, CrsId, CrsRegistry};
pub use ellipsoid::Ellipsoid;
pub use error::{GeoError, GeoResult};
pub use geometry::{Coordinate, Geometry, Shape};
pub use transform::{TransformBuilder, Transformation};
