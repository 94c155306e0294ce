// crates/gs_io/src/lib.rs

//! GridSplit IO 层
//!
//! 负责磁盘布局：文本数据格式、全局数据集读写、拆分/合并编排与拆分目录检查。
//!
//! # 模块
//!
//! - [`format`]: 各数据文件的读写
//! - [`dataset`]: 全局数据集与文件算例
//! - [`assembler`]: `DatasetAssembler` 拆分/合并
//! - [`validate`]: 拆分目录完整性检查
//! - [`error`]: IO 错误类型
//!
//! # 示例
//!
//! ```no_run
//! use gs_config::PartitionConfig;
//! use gs_io::DatasetAssembler;
//! use gs_partition::{GlobalDomain, Sod2D};
//! use std::path::Path;
//!
//! let assembler = DatasetAssembler::new(PartitionConfig::with_shape(2, 2))?;
//! let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 64, 64));
//! let set = assembler.split_case(&case, Path::new("split/2x2"))?;
//! assembler.merge(&set, Path::new("merged"))?;
//! # Ok::<(), gs_foundation::GsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod dataset;
pub mod error;
pub mod format;
pub mod validate;

pub use assembler::{DatasetAssembler, SubdomainDatasetSet};
pub use dataset::{FileCase, GlobalDataset};
pub use error::{IoError, IoResult};
pub use validate::validate_split;
