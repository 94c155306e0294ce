// crates/gs_foundation/src/lib.rs

//! GridSplit Foundation Layer
//!
//! 基础层，提供整个项目共享的抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型与 `ensure!`/`require!` 宏
//! - [`ids`]: 强类型单元与子域标识
//! - [`validation`]: 数据集验证报告
//!
//! # 示例
//!
//! ```
//! use gs_foundation::prelude::*;
//!
//! fn owner(sx: usize, sy: usize, px: usize) -> GsResult<SubdomainId> {
//!     ensure!(sx < px, GsError::invalid_input("sx 越界"));
//!     Ok(SubdomainId::from_grid(sx, sy, px))
//! }
//!
//! assert_eq!(owner(1, 0, 2).unwrap().get(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ids;
pub mod validation;

// 重导出常用类型
pub use error::{GsError, GsResult};
pub use ids::{CellUid, SubdomainId};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{GsError, GsResult};
    pub use crate::ids::{CellUid, SubdomainId};
    pub use crate::validation::{ValidationError, ValidationReport, ValidationWarning};
    pub use crate::{ensure, require};
}
