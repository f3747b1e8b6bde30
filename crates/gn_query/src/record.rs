// crates/gn_query/src/record.rs
//! 查询的输入与输出数据

use gn_geo::crs::WGS84_ID;
use gn_geo::geometry::Geometry;
use serde::{Deserialize, Serialize};

/// 候选位置记录
///
/// `geometry` 缺失的记录不参与排名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// 标识
    pub id: i64,
    /// 名称
    pub name: String,
    /// 经度 (度)
    pub longitude: f64,
    /// 纬度 (度)
    pub latitude: f64,
    /// 几何
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl LocationRecord {
    /// 由经纬度创建记录，几何为 WGS84 点
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            longitude,
            latitude,
            geometry: Some(Geometry::point(WGS84_ID, longitude, latitude)),
        }
    }

    /// 去掉几何
    #[must_use]
    pub fn without_geometry(mut self) -> Self {
        self.geometry = None;
        self
    }

    /// 替换几何
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// 几何缺失时由经纬度补出 WGS84 点
    #[must_use]
    pub fn with_derived_geometry(mut self) -> Self {
        if self.geometry.is_none() {
            self.geometry = Some(Geometry::point(WGS84_ID, self.longitude, self.latitude));
        }
        self
    }
}

/// 查询请求：当前位置的经纬度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestQuery {
    /// 经度 (度)
    pub longitude: f64,
    /// 纬度 (度)
    pub latitude: f64,
}

/// 已排名的候选
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedLocation<'a> {
    /// 候选记录
    pub record: &'a LocationRecord,
    /// 在输入中的位置
    pub index: usize,
    /// 投影坐标系下的距离（投影单位）
    pub distance: f64,
}

/// 因错误被跳过的候选
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    /// 在输入中的位置
    pub index: usize,
    /// 记录标识
    pub id: i64,
    /// 原因
    pub reason: String,
}

/// 查询结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NearestResult<'a> {
    /// 按距离升序排列的候选，距离相同按输入顺序
    pub ranked: Vec<RankedLocation<'a>>,
    /// 被跳过的候选，按输入顺序
    pub skipped: Vec<SkippedCandidate>,
}

impl<'a> NearestResult<'a> {
    /// 最近的候选
    #[must_use]
    pub fn nearest(&self) -> Option<&RankedLocation<'a>> {
        self.ranked.first()
    }

    /// 前 k 个候选
    #[must_use]
    pub fn k_nearest(&self, k: usize) -> &[RankedLocation<'a>] {
        &self.ranked[..k.min(self.ranked.len())]
    }

    /// 是否没有排名结果
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// 排名结果数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_wgs84_point() {
        let record = LocationRecord::new(1, "Pike Place", -122.34, 47.61);
        assert_eq!(record.geometry, Some(Geometry::point(4326, -122.34, 47.61)));
        assert!(record.clone().without_geometry().geometry.is_none());
        assert_eq!(record.clone().without_geometry().with_derived_geometry(), record);
    }

    #[test]
    fn test_record_json_without_geometry() {
        let json = r#"{"id": 7, "name": "Bellevue", "longitude": -122.2, "latitude": 47.61}"#;
        let record: LocationRecord = serde_json::from_str(json).expect("parse");
        assert_eq!(record.id, 7);
        assert!(record.geometry.is_none());
    }

    #[test]
    fn test_query_json() {
        let query: NearestQuery =
            serde_json::from_str(r#"{"longitude": -122.33, "latitude": 47.61}"#).expect("parse");
        assert_eq!(query.longitude, -122.33);
    }

    #[test]
    fn test_k_nearest_clamps() {
        let records = [
            LocationRecord::new(1, "a", 0.0, 0.0),
            LocationRecord::new(2, "b", 1.0, 1.0),
        ];
        let result = NearestResult {
            ranked: records
                .iter()
                .enumerate()
                .map(|(index, record)| RankedLocation {
                    record,
                    index,
                    distance: index as f64,
                })
                .collect(),
            skipped: Vec::new(),
        };
        assert_eq!(result.len(), 2);
        assert_eq!(result.k_nearest(1).len(), 1);
        assert_eq!(result.k_nearest(10).len(), 2);
        assert_eq!(result.nearest().map(|r| r.record.id), Some(1));
        assert!(NearestResult::default().is_empty());
    }
}
