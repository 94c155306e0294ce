// crates/gs_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `GsError` 枚举和 `GsResult` 类型别名，贯穿拆分与合并流程。
//!
//! # 错误分类
//!
//! - **配置错误**: 分区形状不能整除、尺寸非正
//! - **越界错误**: 坐标超出内部区域或 ghost 环
//! - **形状不匹配**: 子域分片与其声明尺寸不一致
//! - **IO 错误**: 持久化文件缺失或损坏
//!
//! 所有错误对当前操作都是致命的，不做重试。
//!
//! # 示例
//!
//! ```
//! use gs_foundation::error::{GsError, GsResult};
//!
//! fn check_divisible(n: usize, p: usize) -> GsResult<()> {
//!     if n % p != 0 {
//!         return Err(GsError::configuration(format!("{n} 不能被 {p} 整除")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_divisible(100, 3).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::ids::SubdomainId;

/// 统一结果类型
pub type GsResult<T> = Result<T, GsError>;

/// GridSplit 错误类型
#[derive(Error, Debug)]
pub enum GsError {
    // ========================================================================
    // 配置与输入
    // ========================================================================

    /// 配置错误（不可整除的分区、非正尺寸等）
    #[error("配置错误: {message}")]
    Configuration {
        /// 具体错误信息
        message: String,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    // ========================================================================
    // 坐标与形状
    // ========================================================================

    /// 坐标超出有效范围
    #[error(
        "坐标超出范围: {context} ({x}, {y}), 有效范围 x∈[{x_min}, {x_max}), y∈[{y_min}, {y_max})"
    )]
    OutOfRange {
        /// 出错位置描述
        context: String,
        /// x 坐标
        x: i64,
        /// y 坐标
        y: i64,
        /// x 下界（含）
        x_min: i64,
        /// x 上界（不含）
        x_max: i64,
        /// y 下界（含）
        y_min: i64,
        /// y 上界（不含）
        y_max: i64,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 子域分片形状不匹配
    #[error("形状不匹配: {location}: {message}")]
    ShapeMismatch {
        /// 子域与字段位置，如 `sdd3/rho`
        location: String,
        /// 具体错误信息
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: String,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    // ========================================================================
    // IO 相关错误
    // ========================================================================

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 文件解析错误
    #[error("文件解析错误: {file} 第{line}行: {message}")]
    ParseError {
        /// 文件路径
        file: PathBuf,
        /// 行号（从 1 开始）
        line: usize,
        /// 错误信息
        message: String,
    },

    // ========================================================================
    // 其他
    // ========================================================================

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

impl GsError {
    /// 配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 坐标越界，`x_range`/`y_range` 为半开区间
    pub fn out_of_range(
        context: impl Into<String>,
        coord: (i64, i64),
        x_range: (i64, i64),
        y_range: (i64, i64),
    ) -> Self {
        Self::OutOfRange {
            context: context.into(),
            x: coord.0,
            y: coord.1,
            x_min: x_range.0,
            x_max: x_range.1,
            y_min: y_range.0,
            y_max: y_range.1,
        }
    }

    /// 索引越界
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 子域分片形状不匹配
    pub fn shape_mismatch(
        sdd: SubdomainId,
        field: impl AsRef<str>,
        message: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            location: format!("{}/{}", sdd.dir_name(), field.as_ref()),
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// IO 错误（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 资源未找到
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

// ========================================================================
// 分类判断
// ========================================================================

impl GsError {
    /// 是否为配置错误
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// 是否为坐标越界错误
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::IndexOutOfBounds { .. })
    }

    /// 是否为形状不匹配错误
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. } | Self::SizeMismatch { .. })
    }

    /// 是否为 IO 类错误（含文件缺失与解析失败）
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::FileNotFound { .. } | Self::ParseError { .. }
        )
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl GsError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &str, expected: usize, actual: usize) -> GsResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> GsResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for GsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 便捷宏
// ========================================================================

/// 条件不满足时提前返回错误
///
/// ```
/// use gs_foundation::{ensure, GsError, GsResult};
///
/// fn positive(v: i64) -> GsResult<i64> {
///     ensure!(v > 0, GsError::invalid_input("必须为正"));
///     Ok(v)
/// }
/// assert!(positive(-1).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

/// 解包 `Option`，为 `None` 时提前返回错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr $(,)?) => {
        match $opt {
            Some(v) => v,
            None => return Err($err.into()),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ensure, require};

    #[test]
    fn test_error_display() {
        let err = GsError::configuration("100 不能被 3 整除");
        assert!(err.to_string().contains("配置错误"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_out_of_range_display() {
        let err = GsError::out_of_range("边界记录", (-3, 0), (-1, 5), (-1, 5));
        let msg = err.to_string();
        assert!(msg.contains("(-3, 0)"));
        assert!(msg.contains("[-1, 5)"));
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_shape_mismatch_location() {
        let err = GsError::shape_mismatch(SubdomainId::new(3), "rho", "局部坐标 (4, 0) 超出 2x2");
        assert!(err.to_string().contains("sdd3/rho"));
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_check_size() {
        assert!(GsError::check_size("rho", 16, 16).is_ok());
        assert!(GsError::check_size("rho", 16, 15).is_err());
    }

    #[test]
    fn test_check_index() {
        assert!(GsError::check_index("Cell", 5, 10).is_ok());
        assert!(GsError::check_index("Cell", 10, 10).is_err());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: GsError = io_err.into();
        assert!(matches!(err, GsError::Io { .. }));
        assert!(err.is_io());
    }

    #[test]
    fn test_ensure_macro() {
        fn check(value: i32) -> GsResult<()> {
            ensure!(value > 0, GsError::invalid_input("value must be positive"));
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(check(-1).is_err());
    }

    #[test]
    fn test_require_macro() {
        fn get_value(opt: Option<i32>) -> GsResult<i32> {
            let v = require!(opt, GsError::not_found("value"));
            Ok(v)
        }

        assert_eq!(get_value(Some(42)).unwrap(), 42);
        assert!(get_value(None).is_err());
    }
}
