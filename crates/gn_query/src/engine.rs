// crates/gn_query/src/engine.rs
//! 最近要素查询引擎
//!
//! 查询流程：
//! 1. 构建查询 CRS → 投影 CRS 的变换，投影查询点（失败则整个查询失败）
//! 2. 逐个候选：取缓存变换，投影几何，计算平面距离（失败的候选被跳过并记录）
//! 3. 按距离稳定升序排序
//!
//! 候选数达到并行阈值时使用 rayon 并行计算，结果顺序与输入一致。

use crate::record::{LocationRecord, NearestQuery, NearestResult, RankedLocation, SkippedCandidate};
use gn_geo::crs::{CrsId, WGS84_ID};
use gn_geo::error::{GeoError, GeoResult};
use gn_geo::geometry::{point_to_shape_distance, transform_geometry, Coordinate};
use gn_geo::transform::TransformBuilder;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

/// 默认并行阈值
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// 单个候选的计算结果
enum Outcome {
    Ranked(f64),
    Skipped(String),
    Excluded,
}

/// 最近要素查询引擎
#[derive(Debug, Clone)]
pub struct NearestFeatureEngine {
    builder: Arc<TransformBuilder>,
    query_crs: CrsId,
    parallel_threshold: usize,
}

impl NearestFeatureEngine {
    /// 创建引擎，查询坐标默认为 WGS84
    #[must_use]
    pub fn new(builder: Arc<TransformBuilder>) -> Self {
        Self {
            builder,
            query_crs: WGS84_ID,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// 设置查询坐标所在的 CRS
    #[must_use]
    pub fn with_query_crs(mut self, crs: CrsId) -> Self {
        self.query_crs = crs;
        self
    }

    /// 设置并行阈值（至少为 1）
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    /// 查询坐标所在的 CRS
    #[must_use]
    pub fn query_crs(&self) -> CrsId {
        self.query_crs
    }

    /// 使用的变换构建器
    #[must_use]
    pub fn builder(&self) -> &Arc<TransformBuilder> {
        &self.builder
    }

    /// 按投影平面距离对候选排序
    ///
    /// # Errors
    /// `projected` 不是已登记的投影坐标系，查询 CRS 到投影 CRS 的变换无法构建，
    /// 或查询点投影失败
    pub fn find_nearest<'a>(
        &self,
        query: Coordinate,
        candidates: &'a [LocationRecord],
        projected: CrsId,
    ) -> GeoResult<NearestResult<'a>> {
        // 地理坐标系下的欧氏距离没有意义
        if !self.builder.registry().lookup(projected)?.is_projected() {
            return Err(GeoError::not_projected(projected));
        }
        let to_plane = self.builder.build(self.query_crs, projected)?;
        let origin = to_plane.apply(query)?;
        debug!(
            query = %query,
            projected,
            candidates = candidates.len(),
            "开始最近要素查询"
        );

        let evaluate = |record: &LocationRecord| -> Outcome {
            let Some(geometry) = &record.geometry else {
                return Outcome::Excluded;
            };
            let distance = self
                .builder
                .build(geometry.crs, projected)
                .and_then(|t| transform_geometry(&t, geometry))
                .map(|g| point_to_shape_distance(&origin, &g.shape));
            match distance {
                Ok(d) if d.is_finite() => Outcome::Ranked(d),
                Ok(d) => Outcome::Skipped(format!("距离不是有限值: {d}")),
                Err(e) => Outcome::Skipped(e.to_string()),
            }
        };

        let outcomes: Vec<Outcome> = if candidates.len() >= self.parallel_threshold {
            candidates.par_iter().map(evaluate).collect()
        } else {
            candidates.iter().map(evaluate).collect()
        };

        let mut result = NearestResult::default();
        for (index, (record, outcome)) in candidates.iter().zip(outcomes).enumerate() {
            match outcome {
                Outcome::Ranked(distance) => result.ranked.push(RankedLocation {
                    record,
                    index,
                    distance,
                }),
                Outcome::Skipped(reason) => {
                    warn!(index, id = record.id, %reason, "跳过候选");
                    result.skipped.push(SkippedCandidate {
                        index,
                        id: record.id,
                        reason,
                    });
                }
                Outcome::Excluded => {}
            }
        }

        // 稳定排序，距离相同保持输入顺序
        result.ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        debug!(
            ranked = result.ranked.len(),
            skipped = result.skipped.len(),
            "最近要素查询完成"
        );
        Ok(result)
    }

    /// 以经纬度请求查询
    ///
    /// # Errors
    /// 同 [`find_nearest`](Self::find_nearest)
    pub fn find_nearest_to<'a>(
        &self,
        query: &NearestQuery,
        candidates: &'a [LocationRecord],
        projected: CrsId,
    ) -> GeoResult<NearestResult<'a>> {
        self.find_nearest(
            Coordinate::new(query.longitude, query.latitude),
            candidates,
            projected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gn_geo::crs::{CrsRegistry, WASHINGTON_NORTH_ID};
    use gn_geo::geometry::Geometry;

    fn engine() -> NearestFeatureEngine {
        let registry = Arc::new(CrsRegistry::with_defaults());
        NearestFeatureEngine::new(Arc::new(TransformBuilder::new(registry)))
    }

    #[test]
    fn test_empty_candidates() {
        let result = engine()
            .find_nearest(Coordinate::new(-122.33, 47.61), &[], WASHINGTON_NORTH_ID)
            .expect("empty");
        assert!(result.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_query_transform_failure_aborts() {
        let candidates = [LocationRecord::new(1, "a", -122.2, 47.61)];
        assert_eq!(
            engine()
                .find_nearest(Coordinate::new(-122.33, 47.61), &candidates, 9999)
                .unwrap_err(),
            GeoError::unknown_crs(9999)
        );
        assert!(matches!(
            engine().find_nearest(
                Coordinate::new(f64::NAN, 47.61),
                &candidates,
                WASHINGTON_NORTH_ID
            ),
            Err(GeoError::ProjectionFailed { .. })
        ));
    }

    #[test]
    fn test_geographic_target_rejected() {
        let candidates = [
            LocationRecord::new(1, "north", -122.33, 48.00),
            LocationRecord::new(2, "east", -121.88, 47.61),
        ];
        let engine = engine();
        assert_eq!(
            engine
                .find_nearest(Coordinate::new(-122.33, 47.61), &candidates, WGS84_ID)
                .unwrap_err(),
            GeoError::not_projected(WGS84_ID)
        );
        assert_eq!(engine.builder().cached_len(), 0);

        // 同一组候选在平面上东侧更近
        let result = engine
            .find_nearest(Coordinate::new(-122.33, 47.61), &candidates, WASHINGTON_NORTH_ID)
            .expect("query");
        assert_eq!(result.nearest().map(|r| r.record.id), Some(2));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = [
            LocationRecord::new(1, "east", -122.20, 47.61),
            LocationRecord::new(2, "same", -122.33, 47.61),
            LocationRecord::new(3, "same again", -122.33, 47.61),
        ];
        let result = engine()
            .find_nearest(Coordinate::new(-122.33, 47.61), &candidates, WASHINGTON_NORTH_ID)
            .expect("query");
        let ids: Vec<i64> = result.ranked.iter().map(|r| r.record.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(result.ranked[0].distance, 0.0);
    }

    #[test]
    fn test_absent_and_broken_geometry() {
        let candidates = [
            LocationRecord::new(1, "ok", -122.20, 47.61),
            LocationRecord::new(2, "no geometry", -122.30, 47.61).without_geometry(),
            LocationRecord::new(3, "unknown crs", 0.0, 0.0)
                .with_geometry(Geometry::point(9999, 0.0, 0.0)),
            LocationRecord::new(4, "empty line", 0.0, 0.0)
                .with_geometry(Geometry::line_string(4326, vec![])),
        ];
        let result = engine()
            .find_nearest(Coordinate::new(-122.33, 47.61), &candidates, WASHINGTON_NORTH_ID)
            .expect("query");
        assert_eq!(result.len(), 1);
        assert_eq!(result.ranked[0].record.id, 1);
        let skipped: Vec<(usize, i64)> = result.skipped.iter().map(|s| (s.index, s.id)).collect();
        assert_eq!(skipped, vec![(2, 3), (3, 4)]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let candidates: Vec<_> = (0..200)
            .map(|i| {
                let k = f64::from(i);
                let lon = -123.0 + (k * 0.37) % 4.0;
                let lat = 46.0 + (k * 0.23) % 3.0;
                LocationRecord::new(i64::from(i), format!("p{i}"), lon, lat)
            })
            .collect();
        let query = Coordinate::new(-122.33, 47.61);
        let sequential = engine()
            .with_parallel_threshold(usize::MAX)
            .find_nearest(query, &candidates, WASHINGTON_NORTH_ID)
            .expect("sequential");
        let parallel = engine()
            .with_parallel_threshold(1)
            .find_nearest(query, &candidates, WASHINGTON_NORTH_ID)
            .expect("parallel");
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 200);
    }
}
