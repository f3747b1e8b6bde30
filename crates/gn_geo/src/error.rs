// crates/gn_geo/src/error.rs
//! 地理空间处理错误类型
//!
//! 包含坐标系统查找、投影转换、几何结构校验相关的错误。
//! 所有错误可转换为 `gn_foundation::GnError` 向上传播。
//!
//! # 错误分类
//!
//! - **查找错误**：CRS 标识未注册
//! - **配置错误**：投影方法未实现、CRS 定义无效、WKT 解析失败
//! - **几何错误**：几何结构不合法、几何与变换的 CRS 不一致
//! - **计算错误**：投影公式数值失败（极点、迭代不收敛）

use crate::crs::CrsId;
use gn_foundation::GnError;
use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 地理空间处理错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// CRS 标识未在注册表中登记
    #[error("未知的 CRS: {id}")]
    UnknownCrs {
        /// 请求的 CRS 标识
        id: CrsId,
    },

    /// 已登记的 CRS 使用了未实现的投影方法
    #[error("CRS {id} 使用了不支持的投影方法: {method}")]
    UnsupportedProjection {
        /// CRS 标识
        id: CrsId,
        /// 投影方法名称
        method: String,
    },

    /// 几何结构不满足约束
    #[error("几何结构不合法: {reason}")]
    MalformedGeometry {
        /// 不合法原因
        reason: String,
    },

    /// CRS 定义不满足注册表约束
    #[error("CRS {id} 定义无效: {reason}")]
    InvalidDefinition {
        /// CRS 标识
        id: CrsId,
        /// 无效原因
        reason: String,
    },

    /// 几何的 CRS 与变换的源 CRS 不一致
    #[error("CRS 不匹配: 期望 {expected}, 实际 {actual}")]
    CrsMismatch {
        /// 变换的源 CRS
        expected: CrsId,
        /// 几何声明的 CRS
        actual: CrsId,
    },

    /// 投影转换失败
    #[error("投影转换失败 [{operation}]: {message}")]
    ProjectionFailed {
        /// 操作类型（如"正向投影"、"逆向投影"）
        operation: &'static str,
        /// 错误详情
        message: String,
    },

    /// 需要投影坐标系的位置给出了地理坐标系
    #[error("CRS {id} 不是投影坐标系，无法计算平面距离")]
    NotProjected {
        /// CRS 标识
        id: CrsId,
    },

    /// WKT 定义解析失败
    #[error("WKT 解析失败: {reason}")]
    WktParse {
        /// 失败原因
        reason: String,
    },
}

// ============================================================================
// 转换实现
// ============================================================================

impl From<GeoError> for GnError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::UnknownCrs { id } => GnError::crs(format!("未知的 CRS: {id}")),
            GeoError::UnsupportedProjection { id, method } => {
                GnError::crs(format!("CRS {id} 使用了不支持的投影方法: {method}"))
            }
            GeoError::MalformedGeometry { reason } => {
                GnError::invalid_input(format!("几何结构不合法: {reason}"))
            }
            GeoError::InvalidDefinition { id, reason } => {
                GnError::invalid_config(format!("crs.{id}"), id.to_string(), reason)
            }
            GeoError::CrsMismatch { expected, actual } => {
                GnError::invalid_input(format!("CRS 不匹配: 期望 {expected}, 实际 {actual}"))
            }
            GeoError::ProjectionFailed { operation, message } => {
                GnError::projection(format!("[{operation}] {message}"))
            }
            GeoError::NotProjected { id } => {
                GnError::invalid_input(format!("CRS {id} 不是投影坐标系"))
            }
            GeoError::WktParse { reason } => GnError::config(format!("WKT 解析失败: {reason}")),
        }
    }
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl GeoError {
    /// 创建未知 CRS 错误
    #[inline]
    pub fn unknown_crs(id: CrsId) -> Self {
        Self::UnknownCrs { id }
    }

    /// 创建不支持的投影方法错误
    #[inline]
    pub fn unsupported_projection(id: CrsId, method: impl Into<String>) -> Self {
        Self::UnsupportedProjection {
            id,
            method: method.into(),
        }
    }

    /// 创建几何结构不合法错误
    #[inline]
    pub fn malformed_geometry(reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            reason: reason.into(),
        }
    }

    /// 创建 CRS 定义无效错误
    #[inline]
    pub fn invalid_definition(id: CrsId, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            id,
            reason: reason.into(),
        }
    }

    /// 创建 CRS 不匹配错误
    #[inline]
    pub fn crs_mismatch(expected: CrsId, actual: CrsId) -> Self {
        Self::CrsMismatch { expected, actual }
    }

    /// 创建投影转换失败错误
    #[inline]
    pub fn projection_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProjectionFailed {
            operation,
            message: message.into(),
        }
    }

    /// 创建非投影坐标系错误
    #[inline]
    pub fn not_projected(id: CrsId) -> Self {
        Self::NotProjected { id }
    }

    /// 创建 WKT 解析失败错误
    #[inline]
    pub fn wkt_parse(reason: impl Into<String>) -> Self {
        Self::WktParse {
            reason: reason.into(),
        }
    }

    /// 检查条件，不满足则返回错误
    #[inline]
    pub fn ensure(cond: bool, err: Self) -> Result<(), Self> {
        if cond {
            Ok(())
        } else {
            Err(err)
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_crs_error() {
        let err = GeoError::unknown_crs(9999);
        match &err {
            GeoError::UnknownCrs { id } => assert_eq!(*id, 9999),
            _ => panic!("错误的错误类型"),
        }
        assert!(err.to_string().contains("9999"));
    }

    #[test]
    fn test_unsupported_projection_error() {
        let err = GeoError::unsupported_projection(32610, "Transverse_Mercator");
        let msg = err.to_string();
        assert!(msg.contains("32610"));
        assert!(msg.contains("Transverse_Mercator"));
    }

    #[test]
    fn test_malformed_geometry_error() {
        let err = GeoError::malformed_geometry("环至少需要 4 个顶点");
        assert!(err.to_string().contains("4 个顶点"));
    }

    #[test]
    fn test_ensure() {
        assert!(GeoError::ensure(true, GeoError::unknown_crs(1)).is_ok());
        assert_eq!(
            GeoError::ensure(false, GeoError::unknown_crs(1)),
            Err(GeoError::unknown_crs(1))
        );
    }

    #[test]
    fn test_geo_error_to_gn_error() {
        let gn: GnError = GeoError::unknown_crs(9999).into();
        match gn {
            GnError::Crs(msg) => assert!(msg.contains("9999")),
            _ => panic!("应转换为 Crs 类型"),
        }

        let gn: GnError = GeoError::malformed_geometry("空多边形").into();
        assert!(matches!(gn, GnError::InvalidInput { .. }));

        let gn: GnError = GeoError::projection_failed("逆向投影", "迭代不收敛").into();
        match gn {
            GnError::Projection(msg) => {
                assert!(msg.contains("逆向投影"));
                assert!(msg.contains("迭代不收敛"));
            }
            _ => panic!("应转换为 Projection 类型"),
        }

        let gn: GnError = GeoError::invalid_definition(2855, "基准 CRS 不存在").into();
        assert!(matches!(gn, GnError::InvalidConfig { .. }));

        let gn: GnError = GeoError::not_projected(4326).into();
        match gn {
            GnError::InvalidInput { message } => assert!(message.contains("4326")),
            _ => panic!("应转换为 InvalidInput 类型"),
        }
    }
}
