// crates/gs_config/src/lib.rs

//! GridSplit Config Layer
//!
//! 配置层，提供分区配置、并行策略与浮点输出格式。
//!
//! # 模块概览
//!
//! - [`partition_config`]: `PartitionConfig` 分区配置（JSON）
//! - [`parallel`]: `ParallelStrategy` 并行策略、`FloatFormat` 写出格式
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! gs_cli        ─> PartitionConfig
//! gs_io         ─> FloatFormat
//! gs_partition  ─> ParallelStrategy
//! gs_config     (本层)
//! gs_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod parallel;
pub mod partition_config;

// 重导出核心类型
pub use error::ConfigError;
pub use parallel::{FloatFormat, ParallelStrategy};
pub use partition_config::PartitionConfig;
