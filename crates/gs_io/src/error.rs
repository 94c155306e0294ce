// crates/gs_io/src/error.rs
//! IO 错误类型定义
//!
//! 提供 IO 模块的统一错误枚举，支持通过 thiserror 自动转换底层错误。
//! 所有错误最终可转换为 GsError 以实现跨层错误传递。

use std::path::Path;

use gs_foundation::GsError;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 解析错误
    #[error("文件解析错误: {file}:{line} - {message}")]
    ParseError {
        /// 文件路径
        file: String,
        /// 行号（从 1 开始）
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 必需文件缺失
    #[error("缺少文件: {path}")]
    MissingFile {
        /// 文件路径
        path: String,
    },

    /// 数据集不完整
    #[error("数据集不完整: {root}, {reason}")]
    IncompleteDataset {
        /// 数据集根目录
        root: String,
        /// 原因
        reason: String,
    },

    /// 底层 IO 错误
    #[error("IO 错误: {path}: {source}")]
    Io {
        /// 出错路径
        path: String,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 基础层错误转换
    #[error("基础层错误: {0}")]
    Foundation(#[from] GsError),
}

impl IoError {
    /// 解析错误
    pub fn parse(file: &Path, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.display().to_string(),
            line,
            message: message.into(),
        }
    }

    /// 把底层 IO 错误与路径关联，`NotFound` 转为 `MissingFile`
    pub fn at(path: &Path) -> impl FnOnce(std::io::Error) -> IoError + '_ {
        move |source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                IoError::MissingFile {
                    path: path.display().to_string(),
                }
            } else {
                IoError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        }
    }
}

impl From<IoError> for GsError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::ParseError {
                file,
                line,
                message,
            } => GsError::parse(file, line, message),
            IoError::MissingFile { path } => GsError::file_not_found(path),
            IoError::IncompleteDataset { root, reason } => {
                GsError::io(format!("数据集不完整 [{}]: {}", root, reason))
            }
            IoError::Io { path, source } => GsError::io_with_source(path, source),
            IoError::Foundation(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_not_found_becomes_missing_file() {
        let path = PathBuf::from("sdd0/sdd.dat");
        let err = IoError::at(&path)(std::io::Error::new(std::io::ErrorKind::NotFound, "x"));
        assert!(matches!(err, IoError::MissingFile { .. }));
        let gs: GsError = err.into();
        assert!(gs.is_io());
    }

    #[test]
    fn test_foundation_passthrough() {
        let err = IoError::from(GsError::configuration("Px=0"));
        let gs: GsError = err.into();
        assert!(gs.is_configuration());
    }

    #[test]
    fn test_parse_display() {
        let err = IoError::parse(Path::new("bc.dat"), 3, "缺少载荷");
        assert!(err.to_string().contains("bc.dat:3"));
    }
}
