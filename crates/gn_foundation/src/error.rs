// crates/gn_foundation/src/error.rs
//! 错误处理模块，定义统一错误类型
//!
//! 提供 `GnError` 枚举和 `GnResult` 类型别名。各层（`gn_geo`、`gn_config`）
//! 定义自己的错误枚举，并通过 `From` 汇聚到 `GnError` 向上传播。

use thiserror::Error;

/// 统一结果类型
pub type GnResult<T> = Result<T, GnError>;

/// GeoNear 错误类型
#[derive(Error, Debug)]
pub enum GnError {
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidConfig {
        /// 配置键名
        key: String,
        /// 配置值
        value: String,
        /// 无效原因说明
        reason: String,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// 投影错误
    #[error("投影错误: {0}")]
    Projection(String),

    /// 坐标系错误
    #[error("坐标系错误: {0}")]
    Crs(String),

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound {
        /// 资源名称
        resource: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl GnError {
    /// IO 错误（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 配置值无效
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 投影错误
    pub fn projection(message: impl Into<String>) -> Self {
        Self::Projection(message.into())
    }

    /// 坐标系错误
    pub fn crs(message: impl Into<String>) -> Self {
        Self::Crs(message.into())
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 是否为用户输入/配置类错误（调用方可修正）
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::Config { .. }
                | Self::InvalidConfig { .. }
                | Self::Crs(_)
                | Self::NotFound { .. }
        )
    }
}

impl From<std::io::Error> for GnError {
    fn from(err: std::io::Error) -> Self {
        Self::io_with_source(err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = GnError::invalid_config("query.projected_crs", "4326", "必须为投影坐标系");
        let msg = err.to_string();
        assert!(msg.contains("query.projected_crs"));
        assert!(msg.contains("4326"));
        assert!(msg.contains("投影坐标系"));
    }

    #[test]
    fn test_io_from_std() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err: GnError = io.into();
        match &err {
            GnError::Io { message, source } => {
                assert!(message.contains("missing.json"));
                assert!(source.is_some());
            }
            _ => panic!("错误的错误类型"),
        }
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_user_error_classification() {
        assert!(GnError::crs("未知 CRS 9999").is_user_error());
        assert!(GnError::invalid_input("经度越界").is_user_error());
        assert!(!GnError::projection("迭代不收敛").is_user_error());
        assert!(GnError::not_found("locations.json").is_user_error());
    }
}
