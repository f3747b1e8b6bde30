// crates/gn_config/src/error.rs
//! 配置层错误类型

use gn_foundation::GnError;
use gn_geo::GeoError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// CRS 定义错误
    #[error("CRS 配置错误: {0}")]
    Geo(#[from] GeoError),
}

impl ConfigError {
    /// 无效值
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for GnError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => GnError::io_with_source("读取配置失败", e),
            ConfigError::Parse(msg) => GnError::config(msg),
            ConfigError::InvalidValue { key, value, reason } => {
                GnError::invalid_config(key, value, reason)
            }
            ConfigError::Geo(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid_value("query.parallel_threshold", 0, "必须至少为 1");
        assert!(err.to_string().contains("query.parallel_threshold"));
    }

    #[test]
    fn test_into_gn_error() {
        let gn: GnError = ConfigError::Geo(GeoError::unknown_crs(9999)).into();
        assert!(gn.to_string().contains("9999"));

        let gn: GnError = ConfigError::Parse("bad json".into()).into();
        match gn {
            GnError::Config { message } => assert_eq!(message, "bad json"),
            _ => panic!("错误的错误类型"),
        }
    }
}
