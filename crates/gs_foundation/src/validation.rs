// crates/gs_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于检查已拆分数据集的完整性。
//!
//! # 示例
//!
//! ```
//! use gs_foundation::ids::{CellUid, SubdomainId};
//! use gs_foundation::validation::{ValidationReport, ValidationError};
//!
//! let mut report = ValidationReport::new();
//! report.add_error(ValidationError::DuplicateCell {
//!     uid: CellUid::new(4),
//!     first: SubdomainId::new(0),
//!     second: SubdomainId::new(1),
//! });
//! assert!(!report.is_valid());
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::ids::{CellUid, SubdomainId};

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 必需文件缺失
    MissingFile {
        /// 文件路径
        path: PathBuf,
    },
    /// 单元未被任何子域拥有
    UncoveredCell {
        /// 单元标识
        uid: CellUid,
    },
    /// 单元被多个子域拥有
    DuplicateCell {
        /// 单元标识
        uid: CellUid,
        /// 首个拥有者
        first: SubdomainId,
        /// 重复拥有者
        second: SubdomainId,
    },
    /// 分片坐标超出子域尺寸
    ShardOutOfShape {
        /// 子域
        sdd: SubdomainId,
        /// 字段名（`sdd.dat` 时为 "sdd"）
        field: String,
        /// 局部坐标
        local: (i64, i64),
        /// 声明尺寸
        size: (usize, usize),
    },
    /// 一致性错误
    ConsistencyError {
        /// 错误描述
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile { path } => write!(f, "缺少文件: {}", path.display()),
            Self::UncoveredCell { uid } => write!(f, "单元{}: 未被任何子域拥有", uid),
            Self::DuplicateCell { uid, first, second } => {
                write!(f, "单元{}: 同时属于子域{}和子域{}", uid, first, second)
            }
            Self::ShardOutOfShape {
                sdd,
                field,
                local,
                size,
            } => write!(
                f,
                "子域{} 字段{}: 局部坐标({}, {}) 超出 {}x{}",
                sdd, field, local.0, local.1, size.0, size.1
            ),
            Self::ConsistencyError { message } => write!(f, "一致性错误: {}", message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone)]
pub enum ValidationWarning {
    /// 子域缺少字段文件（按全零处理）
    MissingField {
        /// 子域
        sdd: SubdomainId,
        /// 字段名
        field: String,
    },
    /// 自定义警告
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { sdd, field } => {
                write!(f, "子域{}: 缺少字段{}，按全零处理", sdd, field)
            }
            Self::Custom { message } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());

        report.add_error(ValidationError::UncoveredCell { uid: CellUid::new(2) });
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_report_merge() {
        let mut report1 = ValidationReport::new();
        report1.add_warning(ValidationWarning::MissingField {
            sdd: SubdomainId::new(1),
            field: "rho".into(),
        });

        let mut report2 = ValidationReport::new();
        report2.add_error(ValidationError::ConsistencyError {
            message: "Nx 不能被 Px 整除".into(),
        });

        report1.merge(report2);
        assert_eq!(report1.error_count(), 1);
        assert_eq!(report1.warning_count(), 1);
    }

    #[test]
    fn test_display_lists_details() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::ShardOutOfShape {
            sdd: SubdomainId::new(0),
            field: "rho".into(),
            local: (2, 0),
            size: (2, 2),
        });
        let text = report.to_string();
        assert!(text.contains("错误: 1 个"));
        assert!(text.contains("局部坐标(2, 0)"));
    }
}
