// crates/gn_query/src/lib.rs
//! GeoNear 最近要素查询
//!
//! 把查询点与候选几何投影到同一个平面坐标系，按平面距离排序。
//!
//! # 示例
//!
//! ```
//! use std::sync::Arc;
//! use gn_geo::crs::CrsRegistry;
//! use gn_geo::geometry::Coordinate;
//! use gn_geo::transform::TransformBuilder;
//! use gn_query::{LocationRecord, NearestFeatureEngine};
//!
//! let builder = Arc::new(TransformBuilder::new(Arc::new(CrsRegistry::with_defaults())));
//! let engine = NearestFeatureEngine::new(builder);
//!
//! let candidates = vec![
//!     LocationRecord::new(1, "Bellevue", -122.20, 47.61),
//!     LocationRecord::new(2, "Edmonds", -122.33, 48.00),
//! ];
//! let result = engine
//!     .find_nearest(Coordinate::new(-122.33, 47.61), &candidates, 2855)
//!     .unwrap();
//! assert_eq!(result.nearest().unwrap().record.name, "Bellevue");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod record;

pub use engine::{NearestFeatureEngine, DEFAULT_PARALLEL_THRESHOLD};
pub use record::{LocationRecord, NearestQuery, NearestResult, RankedLocation, SkippedCandidate};
