// crates/gn_foundation/src/lib.rs
//! GeoNear Foundation Layer
//!
//! 基础层，提供整个项目共用的错误类型。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `GnError` 与结果别名 `GnResult`
//!
//! # 示例
//!
//! ```
//! use gn_foundation::error::{GnError, GnResult};
//!
//! fn check_limit(limit: usize) -> GnResult<usize> {
//!     if limit == 0 {
//!         return Err(GnError::invalid_input("limit 必须大于 0"));
//!     }
//!     Ok(limit)
//! }
//!
//! assert!(check_limit(0).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

// 重导出常用类型
pub use error::{GnError, GnResult};
