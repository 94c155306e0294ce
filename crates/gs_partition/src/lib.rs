// crates/gs_partition/src/lib.rs

//! GridSplit 分区核心
//!
//! 把结构化二维网格划分为矩形子域网格，并在内存中完成场与边界记录的
//! 拆分、合并。磁盘布局由 `gs_io` 负责。
//!
//! # 模块
//!
//! - [`coords`]: 全局域与坐标空间（编号规则、局部/全局变换、ghost 环编号）
//! - [`partitioner`]: 网格划分与分区表
//! - [`boundary`]: 边界条件类型与记录
//! - [`router`]: 边界记录路由（含角点复制）
//! - [`field`]: 标量场与字段集合
//! - [`codec`]: 场分片拆分/合并
//! - [`case`]: 算例接口与内置算例
//!
//! # 数据流
//!
//! ```text
//! GlobalDomain ─> GridPartitioner ─> PartitionTable ─┬─> BoundaryConditionRouter
//!                                                    └─> FieldShardCodec
//! ```
//!
//! # 示例
//!
//! ```
//! use gs_partition::prelude::*;
//!
//! let domain = GlobalDomain::new(1.0, 1.0, 4, 4).with_partition(2, 2);
//! let table = GridPartitioner::new(&domain)?.partition()?;
//! let rho = Field::from_fn("rho", 16, |u| u.get() as f64);
//!
//! let codec = FieldShardCodec::default();
//! let shards = codec.split_field(&table, "rho", Some(&rho))?;
//! let merged = codec.merge_field(&table, "rho", &shards)?;
//! assert_eq!(merged, rho);
//! # Ok::<(), gs_foundation::GsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod case;
pub mod codec;
pub mod coords;
pub mod field;
pub mod partitioner;
pub mod router;

// 重导出常用类型
pub use boundary::{BcKind, BoundaryRecord, BoundaryRecordSet, FieldValues};
pub use case::{builtin_case, CaseDefinition, PeriodicTransport, Sod2D};
pub use codec::{FieldShard, FieldShardCodec, ShardEntry, ShardSet};
pub use coords::{CoordinateSpace, GlobalDomain};
pub use field::{Field, FieldSet};
pub use partitioner::{CellPlacement, GridPartitioner, PartitionTable, SubdomainLayout};
pub use router::{BoundaryConditionRouter, Route};

/// Prelude 模块
pub mod prelude {
    pub use crate::boundary::{BcKind, BoundaryRecord, BoundaryRecordSet, FieldValues};
    pub use crate::case::CaseDefinition;
    pub use crate::codec::{FieldShard, FieldShardCodec};
    pub use crate::coords::{CoordinateSpace, GlobalDomain};
    pub use crate::field::{Field, FieldSet};
    pub use crate::partitioner::{GridPartitioner, PartitionTable, SubdomainLayout};
    pub use crate::router::BoundaryConditionRouter;
    pub use gs_foundation::{CellUid, SubdomainId};
}
