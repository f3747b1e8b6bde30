// crates/gn_geo/src/projection/lambert.rs
//! 兰伯特等角圆锥投影 (Lambert Conformal Conic)
//!
//! 椭球面公式，参见 EPSG Guidance Note 7-2 (方法 9801/9802)。
//!
//! 正向：
//! - r = a·F·k0·tⁿ, θ = n(λ − λ0)
//! - E = FE + r·sin θ, N = FN + rF − r·cos θ
//!
//! 逆向：
//! - r' = ±√(ΔE² + (rF − ΔN)²), t' = (r' / (a·F·k0))^(1/n)
//! - θ' = atan2(ΔE, rF − ΔN)（n < 0 时两项取反）
//! - φ 由 t' 迭代求解，λ = θ'/n + λ0

use super::math_utils::{
    conformal_m, conformal_t, latitude_from_t, normalize_longitude, normalize_radians,
};
use super::MapProjection;
use crate::crs::{CrsId, ProjectedParams, ProjectionMethod};
use crate::ellipsoid::Ellipsoid;
use crate::error::{GeoError, GeoResult};

/// 圆锥常数的最小绝对值，低于此值圆锥退化为圆柱
const MIN_CONE_CONSTANT: f64 = 1e-10;

/// 兰伯特等角圆锥投影
///
/// 投影常数在 [`new`](Self::new) 中一次性计算。
#[derive(Debug, Clone, PartialEq)]
pub struct LambertConformalConic {
    /// 第一偏心率
    e: f64,
    /// 圆锥常数 n
    n: f64,
    /// a·F·k0 (m)
    af: f64,
    /// 原点纬度处的半径 rF (m)
    r_origin: f64,
    /// 中央子午线 (弧度)
    lon0: f64,
    /// 假东（线性单位）
    false_easting: f64,
    /// 假北（线性单位）
    false_northing: f64,
    /// 每线性单位的米数
    unit: f64,
    /// 单/双标准纬线
    two_parallels: bool,
}

fn check_latitude(id: CrsId, name: &str, lat: f64) -> GeoResult<f64> {
    if lat.is_finite() && lat.abs() < 90.0 {
        Ok(lat.to_radians())
    } else {
        Err(GeoError::invalid_definition(
            id,
            format!("{name} 必须在 (-90, 90) 范围内, 实际 {lat}"),
        ))
    }
}

impl LambertConformalConic {
    /// 由投影坐标系参数和基准椭球体构造
    ///
    /// # Errors
    /// - 投影方法不是兰伯特圆锥：[`GeoError::UnsupportedProjection`]
    /// - 参数非有限值、纬度越界、圆锥退化、比例因子或单位非正：
    ///   [`GeoError::InvalidDefinition`]
    pub fn new(id: CrsId, params: &ProjectedParams, ellipsoid: Ellipsoid) -> GeoResult<Self> {
        let two_parallels = match &params.method {
            ProjectionMethod::LambertConformalConic2Sp => true,
            ProjectionMethod::LambertConformalConic1Sp => false,
            ProjectionMethod::Other(name) => {
                return Err(GeoError::unsupported_projection(id, name.clone()))
            }
        };

        GeoError::ensure(
            ellipsoid.is_valid(),
            GeoError::invalid_definition(id, format!("椭球体参数无效: {ellipsoid}")),
        )?;
        GeoError::ensure(
            [
                params.central_meridian,
                params.false_easting,
                params.false_northing,
            ]
            .iter()
            .all(|v| v.is_finite()),
            GeoError::invalid_definition(id, "中央子午线或假东/假北不是有限值"),
        )?;
        let unit = params.linear_unit.metres_per_unit;
        GeoError::ensure(
            unit.is_finite() && unit > 0.0,
            GeoError::invalid_definition(id, "线性单位必须为正"),
        )?;

        let e = ellipsoid.e();
        let lat0 = check_latitude(id, "latitude_of_origin", params.latitude_of_origin)?;

        let (n, f, k0) = if two_parallels {
            let lat1 = check_latitude(id, "standard_parallel_1", params.standard_parallel_1)?;
            let lat2 = check_latitude(id, "standard_parallel_2", params.standard_parallel_2)?;
            let (m1, t1) = (conformal_m(lat1, e), conformal_t(lat1, e));
            let n = if (lat1 - lat2).abs() < 1e-12 {
                lat1.sin()
            } else {
                let (m2, t2) = (conformal_m(lat2, e), conformal_t(lat2, e));
                (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
            };
            (n, m1 / (n * t1.powf(n)), 1.0)
        } else {
            GeoError::ensure(
                params.scale_factor.is_finite() && params.scale_factor > 0.0,
                GeoError::invalid_definition(id, "比例因子必须为正"),
            )?;
            let n = lat0.sin();
            let (m0, t0) = (conformal_m(lat0, e), conformal_t(lat0, e));
            (n, m0 / (n * t0.powf(n)), params.scale_factor)
        };

        if !n.is_finite() || n.abs() < MIN_CONE_CONSTANT || !f.is_finite() {
            return Err(GeoError::invalid_definition(
                id,
                format!("圆锥常数退化 (n = {n})，标准纬线不能关于赤道对称"),
            ));
        }

        let af = ellipsoid.a * f * k0;
        let r_origin = af * conformal_t(lat0, e).powf(n);

        Ok(Self {
            e,
            n,
            af,
            r_origin,
            lon0: params.central_meridian.to_radians(),
            false_easting: params.false_easting,
            false_northing: params.false_northing,
            unit: params.linear_unit.metres_per_unit,
            two_parallels,
        })
    }

    /// 圆锥常数 n
    #[must_use]
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// 原点纬度处的半径 rF (m)
    #[must_use]
    pub fn origin_radius(&self) -> f64 {
        self.r_origin
    }
}

impl MapProjection for LambertConformalConic {
    fn name(&self) -> &'static str {
        if self.two_parallels {
            "Lambert_Conformal_Conic_2SP"
        } else {
            "Lambert_Conformal_Conic_1SP"
        }
    }

    fn forward(&self, lon: f64, lat: f64) -> GeoResult<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(GeoError::projection_failed("正向投影", "坐标不是有限值"));
        }
        if lat.abs() > 90.0 {
            return Err(GeoError::projection_failed(
                "正向投影",
                format!("纬度超出范围: {lat}"),
            ));
        }

        let t = conformal_t(lat.to_radians(), self.e);
        let r = self.af * t.powf(self.n);
        // 圆锥顶点对侧的极点映射到无穷远
        let opposite_pole = lat.abs() >= 90.0 && lat.signum() != self.n.signum();
        if opposite_pole || !r.is_finite() {
            return Err(GeoError::projection_failed(
                "正向投影",
                format!("纬度 {lat} 位于圆锥顶点对侧的极点"),
            ));
        }
        let theta = self.n * normalize_radians(lon.to_radians() - self.lon0);

        let x = self.false_easting + r * theta.sin() / self.unit;
        let y = self.false_northing + (self.r_origin - r * theta.cos()) / self.unit;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> GeoResult<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoError::projection_failed("逆向投影", "坐标不是有限值"));
        }

        let de = (x - self.false_easting) * self.unit;
        let dn = self.r_origin - (y - self.false_northing) * self.unit;
        let sign = self.n.signum();

        let r = sign * de.hypot(dn);
        if r == 0.0 {
            // 圆锥顶点
            return Ok((normalize_longitude(self.lon0.to_degrees()), sign * 90.0));
        }

        let t = (r / self.af).powf(1.0 / self.n);
        let theta = (sign * de).atan2(sign * dn);
        let lat = latitude_from_t(t, self.e)
            .ok_or_else(|| GeoError::projection_failed("逆向投影", "纬度迭代不收敛"))?;
        let lon = theta / self.n + self.lon0;

        Ok((normalize_longitude(lon.to_degrees()), lat.to_degrees()))
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{CrsDefinition, LinearUnit};

    fn washington_north() -> ProjectedParams {
        match CrsDefinition::washington_north() {
            CrsDefinition::Projected { params, .. } => params,
            CrsDefinition::Geographic { .. } => unreachable!(),
        }
    }

    /// EPSG Guidance Note 7-2 的 Texas South Central (NAD27) 算例
    fn texas_south_central() -> ProjectedParams {
        ProjectedParams {
            name: "NAD27 / Texas South Central".into(),
            base: 4267,
            method: ProjectionMethod::LambertConformalConic2Sp,
            standard_parallel_1: 28.0 + 23.0 / 60.0,
            standard_parallel_2: 30.0 + 17.0 / 60.0,
            latitude_of_origin: 27.0 + 50.0 / 60.0,
            central_meridian: -99.0,
            scale_factor: 1.0,
            false_easting: 2_000_000.0,
            false_northing: 0.0,
            linear_unit: LinearUnit::us_survey_foot(),
        }
    }

    #[test]
    fn test_epsg_2sp_example() {
        let lcc = LambertConformalConic::new(32039, &texas_south_central(), Ellipsoid::CLARKE_1866)
            .expect("construct");
        assert!((lcc.cone_constant() - 0.489_912_6).abs() < 1e-7);

        let (e, n) = lcc.forward(-96.0, 28.5).expect("forward");
        assert!((e - 2_963_503.91).abs() < 0.01, "E = {e}");
        assert!((n - 254_759.80).abs() < 0.01, "N = {n}");

        let (lon, lat) = lcc.inverse(e, n).expect("inverse");
        assert!((lon + 96.0).abs() < 1e-9);
        assert!((lat - 28.5).abs() < 1e-9);
    }

    #[test]
    fn test_epsg_1sp_example() {
        // Jamaica 1969 / Jamaica National Grid
        let params = ProjectedParams {
            name: "JAD69 / Jamaica National Grid".into(),
            base: 4242,
            method: ProjectionMethod::LambertConformalConic1Sp,
            standard_parallel_1: 0.0,
            standard_parallel_2: 0.0,
            latitude_of_origin: 18.0,
            central_meridian: -77.0,
            scale_factor: 1.0,
            false_easting: 250_000.0,
            false_northing: 150_000.0,
            linear_unit: LinearUnit::metre(),
        };
        let lcc = LambertConformalConic::new(24200, &params, Ellipsoid::CLARKE_1866).expect("1sp");
        let lon = -(76.0 + 56.0 / 60.0 + 37.26 / 3600.0);
        let lat = 17.0 + 55.0 / 60.0 + 55.80 / 3600.0;
        let (e, n) = lcc.forward(lon, lat).expect("forward");
        assert!((e - 255_966.58).abs() < 0.01, "E = {e}");
        assert!((n - 142_493.51).abs() < 0.01, "N = {n}");
        assert_eq!(lcc.name(), "Lambert_Conformal_Conic_1SP");
    }

    #[test]
    fn test_washington_north_seattle() {
        let lcc = LambertConformalConic::new(2855, &washington_north(), Ellipsoid::GRS80)
            .expect("construct");
        let (x, y) = lcc.forward(-122.33, 47.61).expect("forward");
        assert!((x - 387_480.74).abs() < 0.05, "x = {x}");
        assert!((y - 68_915.19).abs() < 0.05, "y = {y}");
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let lcc = LambertConformalConic::new(2855, &washington_north(), Ellipsoid::GRS80)
            .expect("construct");
        let (x, y) = lcc.forward(-120.833_333_333_333_3, 47.0).expect("forward");
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip_grid() {
        let lcc = LambertConformalConic::new(2855, &washington_north(), Ellipsoid::GRS80)
            .expect("construct");
        for lon in [-124.5, -122.33, -120.83, -117.1] {
            for lat in [45.5, 47.61, 48.0, 49.2] {
                let (x, y) = lcc.forward(lon, lat).expect("forward");
                let (lon2, lat2) = lcc.inverse(x, y).expect("inverse");
                assert!((lon2 - lon).abs() < 1e-9, "lon {lon} -> {lon2}");
                assert!((lat2 - lat).abs() < 1e-9, "lat {lat} -> {lat2}");
            }
        }
    }

    #[test]
    fn test_pole_handling() {
        let lcc = LambertConformalConic::new(2855, &washington_north(), Ellipsoid::GRS80)
            .expect("construct");
        // 北极是圆锥顶点
        let (x, y) = lcc.forward(-100.0, 90.0).expect("apex");
        assert!((x - 500_000.0).abs() < 1e-6);
        assert!((y - lcc.origin_radius()).abs() < 1e-6);
        let (_, lat) = lcc.inverse(x, y).expect("inverse apex");
        assert!((lat - 90.0).abs() < 1e-12);
        // 南极映射到无穷远
        assert!(matches!(
            lcc.forward(-100.0, -90.0),
            Err(GeoError::ProjectionFailed { .. })
        ));
        assert!(lcc.forward(0.0, 91.0).is_err());
        assert!(lcc.forward(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_southern_cone() {
        let mut params = washington_north();
        params.standard_parallel_1 = -30.0;
        params.standard_parallel_2 = -40.0;
        params.latitude_of_origin = -35.0;
        params.central_meridian = 145.0;
        let lcc = LambertConformalConic::new(9300, &params, Ellipsoid::GRS80).expect("south");
        assert!(lcc.cone_constant() < 0.0);
        let (x, y) = lcc.forward(147.0, -37.5).expect("forward");
        let (lon, lat) = lcc.inverse(x, y).expect("inverse");
        assert!((lon - 147.0).abs() < 1e-9);
        assert!((lat + 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_us_foot_unit_scales_output() {
        let metres = LambertConformalConic::new(2855, &washington_north(), Ellipsoid::GRS80)
            .expect("metre");
        let mut params = washington_north();
        params.linear_unit = LinearUnit::us_survey_foot();
        params.false_easting = 500_000.0 / LinearUnit::us_survey_foot().metres_per_unit;
        let feet = LambertConformalConic::new(2856, &params, Ellipsoid::GRS80).expect("foot");

        let (xm, ym) = metres.forward(-122.0, 48.0).expect("m");
        let (xf, yf) = feet.forward(-122.0, 48.0).expect("ft");
        let k = LinearUnit::us_survey_foot().metres_per_unit;
        assert!((xf * k - xm).abs() < 1e-6);
        assert!((yf * k - ym).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut params = washington_north();
        params.method = ProjectionMethod::Other("Mercator_1SP".into());
        assert!(matches!(
            LambertConformalConic::new(1, &params, Ellipsoid::GRS80),
            Err(GeoError::UnsupportedProjection { id: 1, .. })
        ));

        let mut params = washington_north();
        params.standard_parallel_1 = 90.0;
        assert!(matches!(
            LambertConformalConic::new(2, &params, Ellipsoid::GRS80),
            Err(GeoError::InvalidDefinition { id: 2, .. })
        ));

        let mut params = washington_north();
        params.method = ProjectionMethod::LambertConformalConic1Sp;
        params.latitude_of_origin = 0.0;
        assert!(matches!(
            LambertConformalConic::new(3, &params, Ellipsoid::GRS80),
            Err(GeoError::InvalidDefinition { id: 3, .. })
        ));

        let mut params = washington_north();
        params.linear_unit.metres_per_unit = 0.0;
        assert!(LambertConformalConic::new(4, &params, Ellipsoid::GRS80).is_err());
    }
}
