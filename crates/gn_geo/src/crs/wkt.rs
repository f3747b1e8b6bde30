// crates/gn_geo/src/crs/wkt.rs
//! OGC WKT1 坐标系定义解析
//!
//! 只解析填充 [`CrsDefinition`] 所需的子集：
//!
//! ```text
//! GEOGCS[name, DATUM[name, SPHEROID[name, a, inv_f], TOWGS84[...]?],
//!        PRIMEM[name, lon], UNIT[name, factor], AUTHORITY[...]?]
//! PROJCS[name, GEOGCS[...], PROJECTION[name], PARAMETER[name, value]*,
//!        UNIT[name, factor], AUTHORITY[...]?]
//! ```
//!
//! 方括号和圆括号均可作为定界符；未识别的节点（AXIS 等）被忽略。

use super::{
    CrsDefinition, CrsId, GeographicParams, HelmertParams, LinearUnit, ProjectedParams,
    ProjectionMethod,
};
use crate::ellipsoid::Ellipsoid;
use crate::error::{GeoError, GeoResult};
use tracing::debug;

/// 度对应的弧度（WKT `UNIT["degree", ...]` 的标准值）
const DEGREE_IN_RADIANS: f64 = std::f64::consts::PI / 180.0;

/// WKT 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct WktCrs {
    /// 解析出的 CRS 定义
    pub definition: CrsDefinition,
    /// `PROJCS` 内嵌的基准地理坐标系
    pub base: Option<CrsDefinition>,
}

/// 解析 WKT1 定义
///
/// 标识优先取最外层 `AUTHORITY["EPSG", "code"]`，否则使用 `id_hint`。
///
/// # Errors
/// 语法错误、缺少必需节点或无法确定标识时返回 [`GeoError::WktParse`]
pub fn parse_wkt(text: &str, id_hint: Option<CrsId>) -> GeoResult<WktCrs> {
    let root = Parser::new(text).parse_document()?;
    match root.keyword.as_str() {
        "GEOGCS" => Ok(WktCrs {
            definition: geographic_from_node(&root, id_hint)?,
            base: None,
        }),
        "PROJCS" => {
            let (definition, base) = projected_from_node(&root, id_hint)?;
            Ok(WktCrs {
                definition,
                base: Some(base),
            })
        }
        other => Err(GeoError::wkt_parse(format!("不支持的根节点: {other}"))),
    }
}

// ============================================================================
// 语法树
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Number(f64),
    Ident(String),
    Node(Node),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    keyword: String,
    args: Vec<Value>,
}

impl Node {
    fn child(&self, keyword: &str) -> Option<&Node> {
        self.args.iter().find_map(|arg| match arg {
            Value::Node(node) if node.keyword.eq_ignore_ascii_case(keyword) => Some(node),
            _ => None,
        })
    }

    fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.args.iter().filter_map(move |arg| match arg {
            Value::Node(node) if node.keyword.eq_ignore_ascii_case(keyword) => Some(node),
            _ => None,
        })
    }

    fn require_child(&self, keyword: &str) -> GeoResult<&Node> {
        self.child(keyword)
            .ok_or_else(|| GeoError::wkt_parse(format!("{} 缺少 {keyword} 节点", self.keyword)))
    }

    fn text(&self, index: usize) -> GeoResult<&str> {
        match self.args.get(index) {
            Some(Value::Text(s) | Value::Ident(s)) => Ok(s),
            _ => Err(GeoError::wkt_parse(format!(
                "{} 第 {} 个参数应为字符串",
                self.keyword,
                index + 1
            ))),
        }
    }

    fn number(&self, index: usize) -> GeoResult<f64> {
        match self.args.get(index) {
            Some(Value::Number(v)) => Ok(*v),
            Some(Value::Text(s)) => s.trim().parse().map_err(|_| {
                GeoError::wkt_parse(format!("{} 参数不是数值: {s}", self.keyword))
            }),
            _ => Err(GeoError::wkt_parse(format!(
                "{} 第 {} 个参数应为数值",
                self.keyword,
                index + 1
            ))),
        }
    }

    /// `AUTHORITY["EPSG", "code"]` 中的代码
    fn epsg_code(&self) -> Option<CrsId> {
        let authority = self.child("AUTHORITY")?;
        let name = authority.text(0).ok()?;
        if !name.eq_ignore_ascii_case("EPSG") {
            return None;
        }
        match authority.args.get(1)? {
            Value::Text(code) => code.trim().parse().ok(),
            Value::Number(code) if code.fract() == 0.0 && *code >= 0.0 => Some(*code as CrsId),
            _ => None,
        }
    }
}

// ============================================================================
// 语法分析
// ============================================================================

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    text: &'a str,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            text,
        }
    }

    fn parse_document(&mut self) -> GeoResult<Node> {
        let node = self.parse_node()?;
        self.skip_whitespace();
        if let Some((pos, _)) = self.chars.peek() {
            return Err(GeoError::wkt_parse(format!("位置 {pos} 之后存在多余内容")));
        }
        Ok(node)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        word
    }

    fn parse_node(&mut self) -> GeoResult<Node> {
        self.skip_whitespace();
        let keyword = self.parse_word().to_uppercase();
        if keyword.is_empty() {
            return Err(GeoError::wkt_parse("缺少节点关键字"));
        }
        self.skip_whitespace();
        let close = match self.chars.next() {
            Some((_, '[')) => ']',
            Some((_, '(')) => ')',
            Some((pos, c)) => {
                return Err(GeoError::wkt_parse(format!(
                    "{keyword} 后应为 '[' 或 '(', 位置 {pos} 处为 '{c}'"
                )))
            }
            None => return Err(GeoError::wkt_parse(format!("{keyword} 后意外结束"))),
        };

        let mut args = Vec::new();
        loop {
            self.skip_whitespace();
            if let Some(&(_, c)) = self.chars.peek() {
                if c == close && args.is_empty() {
                    self.chars.next();
                    return Ok(Node { keyword, args });
                }
            }
            args.push(self.parse_value()?);
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, c)) if c == close => return Ok(Node { keyword, args }),
                Some((pos, c)) => {
                    return Err(GeoError::wkt_parse(format!(
                        "{keyword} 中位置 {pos} 处出现意外字符 '{c}'"
                    )))
                }
                None => return Err(GeoError::wkt_parse(format!("{keyword} 缺少结束括号"))),
            }
        }
    }

    fn parse_value(&mut self) -> GeoResult<Value> {
        self.skip_whitespace();
        match self.chars.peek().copied() {
            Some((_, '"')) => self.parse_text().map(Value::Text),
            Some((_, c)) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number().map(Value::Number)
            }
            Some((_, c)) if c.is_alphabetic() => {
                // 关键字后跟括号是子节点，否则是枚举标识（如 AXIS 的 east）
                let checkpoint = self.chars.clone();
                let word = self.parse_word();
                self.skip_whitespace();
                if matches!(self.chars.peek(), Some((_, '[' | '('))) {
                    self.chars = checkpoint;
                    self.parse_node().map(Value::Node)
                } else {
                    Ok(Value::Ident(word))
                }
            }
            Some((pos, c)) => Err(GeoError::wkt_parse(format!(
                "位置 {pos} 处出现意外字符 '{c}'"
            ))),
            None => Err(GeoError::wkt_parse("参数列表意外结束")),
        }
    }

    fn parse_text(&mut self) -> GeoResult<String> {
        self.chars.next();
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next() {
            if c == '"' {
                // WKT 中 "" 表示转义的引号
                if matches!(self.chars.peek(), Some((_, '"'))) {
                    self.chars.next();
                    out.push('"');
                    continue;
                }
                return Ok(out);
            }
            out.push(c);
        }
        Err(GeoError::wkt_parse("字符串缺少结束引号"))
    }

    fn parse_number(&mut self) -> GeoResult<f64> {
        let start = self.chars.peek().map_or(self.text.len(), |(pos, _)| *pos);
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                end = pos + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let literal = &self.text[start..end];
        literal
            .parse()
            .map_err(|_| GeoError::wkt_parse(format!("无效的数值: {literal}")))
    }
}

// ============================================================================
// 语义解析
// ============================================================================

fn geographic_from_node(node: &Node, id_hint: Option<CrsId>) -> GeoResult<CrsDefinition> {
    let name = node.text(0)?.to_string();
    let id = node
        .epsg_code()
        .or(id_hint)
        .ok_or_else(|| {
            GeoError::wkt_parse(format!("GEOGCS \"{name}\" 缺少 AUTHORITY 且未提供标识"))
        })?;

    let datum = node.require_child("DATUM")?;
    let spheroid = datum.require_child("SPHEROID")?;
    let ellipsoid = Ellipsoid::from_inverse_flattening(spheroid.number(1)?, spheroid.number(2)?);

    let to_wgs84 = match datum.child("TOWGS84") {
        Some(towgs84) => Some(helmert_from_node(towgs84)?),
        None => None,
    };

    let prime_meridian = match node.child("PRIMEM") {
        Some(primem) => primem.number(1)?,
        None => 0.0,
    };

    if let Some(unit) = node.child("UNIT") {
        let factor = unit.number(1)?;
        if (factor - DEGREE_IN_RADIANS).abs() > 1e-12 {
            return Err(GeoError::wkt_parse(format!(
                "GEOGCS \"{name}\" 的角度单位必须为度, 实际 {} ({factor})",
                unit.text(0)?
            )));
        }
    }

    Ok(CrsDefinition::geographic(
        id,
        GeographicParams {
            name,
            ellipsoid,
            prime_meridian,
            to_wgs84,
        },
    ))
}

fn helmert_from_node(node: &Node) -> GeoResult<HelmertParams> {
    let values = (0..node.args.len())
        .map(|i| node.number(i))
        .collect::<GeoResult<Vec<_>>>()?;
    match values.as_slice() {
        [dx, dy, dz] => Ok(HelmertParams::translation(*dx, *dy, *dz)),
        [dx, dy, dz, rx, ry, rz, ds] => Ok(HelmertParams {
            dx: *dx,
            dy: *dy,
            dz: *dz,
            rx: *rx,
            ry: *ry,
            rz: *rz,
            ds: *ds,
        }),
        _ => Err(GeoError::wkt_parse(format!(
            "TOWGS84 需要 3 或 7 个参数, 实际 {}",
            values.len()
        ))),
    }
}

fn projected_from_node(
    node: &Node,
    id_hint: Option<CrsId>,
) -> GeoResult<(CrsDefinition, CrsDefinition)> {
    let name = node.text(0)?.to_string();
    let id = node
        .epsg_code()
        .or(id_hint)
        .ok_or_else(|| {
            GeoError::wkt_parse(format!("PROJCS \"{name}\" 缺少 AUTHORITY 且未提供标识"))
        })?;

    let base = geographic_from_node(node.require_child("GEOGCS")?, None)?;
    let method = ProjectionMethod::from_wkt_name(node.require_child("PROJECTION")?.text(0)?);

    let mut params = ProjectedParams {
        name,
        base: base.id(),
        method,
        standard_parallel_1: 0.0,
        standard_parallel_2: f64::NAN,
        latitude_of_origin: 0.0,
        central_meridian: 0.0,
        scale_factor: 1.0,
        false_easting: 0.0,
        false_northing: 0.0,
        linear_unit: LinearUnit::metre(),
    };

    for parameter in node.children("PARAMETER") {
        let key = parameter.text(0)?.to_lowercase();
        let value = parameter.number(1)?;
        match key.as_str() {
            "standard_parallel_1" => params.standard_parallel_1 = value,
            "standard_parallel_2" => params.standard_parallel_2 = value,
            "latitude_of_origin" => params.latitude_of_origin = value,
            "central_meridian" => params.central_meridian = value,
            "scale_factor" => params.scale_factor = value,
            "false_easting" => params.false_easting = value,
            "false_northing" => params.false_northing = value,
            _ => debug!(crs = id, parameter = %key, "忽略未识别的投影参数"),
        }
    }
    // 只给出一条标准纬线时两条重合
    if params.standard_parallel_2.is_nan() {
        params.standard_parallel_2 = params.standard_parallel_1;
    }

    if let Some(unit) = node.child("UNIT") {
        params.linear_unit = LinearUnit {
            name: unit.text(0)?.to_string(),
            metres_per_unit: unit.number(1)?,
        };
    }

    Ok((CrsDefinition::projected(id, params), base))
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{NAD83_HARN_ID, WASHINGTON_NORTH_ID};

    const WASHINGTON_NORTH_WKT: &str = r#"
        PROJCS["NAD83(HARN) / Washington North",
            GEOGCS["NAD83(HARN)",
                DATUM["NAD83_High_Accuracy_Regional_Network",
                    SPHEROID["GRS 1980",6378137,298.257222101,
                        AUTHORITY["EPSG","7019"]],
                    AUTHORITY["EPSG","6152"]],
                PRIMEM["Greenwich",0,
                    AUTHORITY["EPSG","8901"]],
                UNIT["degree",0.01745329251994328,
                    AUTHORITY["EPSG","9122"]],
                AUTHORITY["EPSG","4152"]],
            PROJECTION["Lambert_Conformal_Conic_2SP"],
            PARAMETER["standard_parallel_1",48.73333333333333],
            PARAMETER["standard_parallel_2",47.5],
            PARAMETER["latitude_of_origin",47],
            PARAMETER["central_meridian",-120.8333333333333],
            PARAMETER["false_easting",500000],
            PARAMETER["false_northing",0],
            UNIT["metre",1,
                AUTHORITY["EPSG","9001"]],
            AUTHORITY["EPSG","2855"]]
    "#;

    #[test]
    fn test_parse_projcs() {
        let parsed = parse_wkt(WASHINGTON_NORTH_WKT, None).expect("parse");
        assert_eq!(parsed.definition.id(), WASHINGTON_NORTH_ID);
        let base = parsed.base.expect("base");
        assert_eq!(base.id(), NAD83_HARN_ID);

        match (&parsed.definition, &base) {
            (
                CrsDefinition::Projected { params, .. },
                CrsDefinition::Geographic { params: geo, .. },
            ) => {
                assert_eq!(params.method, ProjectionMethod::LambertConformalConic2Sp);
                assert!((params.standard_parallel_1 - 48.733_333_333_333_33).abs() < 1e-12);
                assert!((params.standard_parallel_2 - 47.5).abs() < 1e-12);
                assert!((params.latitude_of_origin - 47.0).abs() < 1e-12);
                assert!((params.central_meridian + 120.833_333_333_333_3).abs() < 1e-12);
                assert!((params.false_easting - 500_000.0).abs() < 1e-9);
                assert_eq!(params.linear_unit.metres_per_unit, 1.0);
                assert!(geo.ellipsoid.same_shape(&Ellipsoid::GRS80));
                assert_eq!(geo.prime_meridian, 0.0);
            }
            _ => panic!("类别错误"),
        }
    }

    #[test]
    fn test_parse_matches_builtin() {
        let parsed = parse_wkt(WASHINGTON_NORTH_WKT, None).expect("parse");
        match (parsed.definition, CrsDefinition::washington_north()) {
            (
                CrsDefinition::Projected { params: a, .. },
                CrsDefinition::Projected { params: b, .. },
            ) => {
                assert_eq!(a.base, b.base);
                assert_eq!(a.method, b.method);
                assert!((a.central_meridian - b.central_meridian).abs() < 1e-12);
            }
            _ => panic!("类别错误"),
        }
    }

    #[test]
    fn test_parse_geogcs_with_towgs84() {
        let wkt = r#"GEOGCS["NAD27",
            DATUM["North_American_Datum_1927",
                SPHEROID["Clarke 1866",6378206.4,294.9786982138982],
                TOWGS84[-8,160,176,0,0,0,0]],
            PRIMEM["Greenwich",0],
            UNIT["degree",0.0174532925199433],
            AUTHORITY["EPSG","4267"]]"#;
        let parsed = parse_wkt(wkt, None).expect("parse");
        assert!(parsed.base.is_none());
        match parsed.definition {
            CrsDefinition::Geographic { id, params } => {
                assert_eq!(id, 4267);
                assert!(params.ellipsoid.same_shape(&Ellipsoid::CLARKE_1866));
                let shift = params.to_wgs84.expect("towgs84");
                assert_eq!(shift.dx, -8.0);
                assert_eq!(shift.dz, 176.0);
            }
            CrsDefinition::Projected { .. } => panic!("应为地理坐标系"),
        }
    }

    #[test]
    fn test_child_lookup_ignores_keyword_case() {
        let wkt = r#"geogcs["Paris",
            datum["d",spheroid["Clarke 1880",6378249.2,293.4660212936269],
                towgs84[-168,-60,320,0,0,0,0]],
            primem["Paris",2.33722917],
            unit["degree",0.0174532925199433],
            authority["EPSG","4807"]]"#;
        let parsed = parse_wkt(wkt, None).expect("parse");
        match parsed.definition {
            CrsDefinition::Geographic { id, params } => {
                assert_eq!(id, 4807);
                assert!((params.prime_meridian - 2.337_229_17).abs() < 1e-12);
                assert_eq!(params.to_wgs84.expect("towgs84").dx, -168.0);
            }
            CrsDefinition::Projected { .. } => panic!("应为地理坐标系"),
        }
    }

    #[test]
    fn test_id_hint_used_without_authority() {
        let wkt = r#"GEOGCS["local",
            DATUM["d",SPHEROID["GRS 1980",6378137,298.257222101]],
            PRIMEM["Greenwich",0],
            UNIT["degree",0.0174532925199433]]"#;
        assert!(matches!(parse_wkt(wkt, None), Err(GeoError::WktParse { .. })));
        let parsed = parse_wkt(wkt, Some(9001)).expect("hint");
        assert_eq!(parsed.definition.id(), 9001);
    }

    #[test]
    fn test_unsupported_method_is_kept() {
        let wkt = r#"PROJCS["UTM 10N",
            GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],
                PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]],
            PROJECTION["Transverse_Mercator"],
            PARAMETER["central_meridian",-123],
            PARAMETER["scale_factor",0.9996],
            UNIT["metre",1],
            AUTHORITY["EPSG","32610"]]"#;
        let parsed = parse_wkt(wkt, None).expect("parse");
        match parsed.definition {
            CrsDefinition::Projected { params, .. } => {
                assert_eq!(params.method, ProjectionMethod::Other("Transverse_Mercator".into()));
                assert!((params.scale_factor - 0.9996).abs() < 1e-12);
            }
            CrsDefinition::Geographic { .. } => panic!("应为投影坐标系"),
        }
    }

    #[test]
    fn test_parentheses_and_ident_values() {
        let wkt = r#"GEOGCS("WGS 84",DATUM("WGS_1984",SPHEROID("WGS 84",6378137,298.257223563)),
            PRIMEM("Greenwich",0),UNIT("degree",0.0174532925199433),
            AXIS("Lon",EAST),AXIS("Lat",NORTH),AUTHORITY("EPSG","4326"))"#;
        let parsed = parse_wkt(wkt, None).expect("parse");
        assert_eq!(parsed.definition.id(), 4326);
    }

    #[test]
    fn test_rejects_non_degree_unit() {
        let wkt = r#"GEOGCS["grads",
            DATUM["d",SPHEROID["s",6378137,298.257223563]],
            PRIMEM["Greenwich",0],
            UNIT["grad",0.01570796326794897],
            AUTHORITY["EPSG","9999"]]"#;
        assert!(matches!(parse_wkt(wkt, None), Err(GeoError::WktParse { .. })));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_wkt("", None).is_err());
        assert!(parse_wkt(r#"GEOGCS["x""#, None).is_err());
        assert!(parse_wkt(r#"GEOGCS["x",DATUM["d",SPHEROID["s",abc,1]]]"#, None).is_err());
        assert!(parse_wkt(r#"GEOGCS["x"] trailing"#, None).is_err());
        assert!(parse_wkt(r#"VERT_CS["x"]"#, None).is_err());
    }
}
