// crates/gs_partition/src/codec.rs

//! 场分片编解码
//!
//! - **拆分**: 按分区表把全局场分到各子域，得到局部坐标 → 值的分片；
//!   源字段缺失时所有子域都不生成分片。
//! - **合并**: 按子域坐标表（从磁盘 `sdd.dat` 重建，而非重新计算）
//!   把各子域分片写回全局场；某子域没有分片时其单元保持为零。
//!
//! 用同一分区表拆分再合并得到的场与原场逐值相等。
//!
//! 合并阶段各子域分片并行解码，随后串行散射到全局数组。每个 uid 只属于
//! 一个子域，重复写入说明分片损坏，报告为 `ShapeMismatch`。

use gs_config::ParallelStrategy;
use gs_foundation::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use crate::field::{Field, FieldSet};
use crate::partitioner::{PartitionTable, SubdomainLayout};

// ============================================================
// 分片
// ============================================================

/// 分片条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShardEntry {
    /// 局部坐标
    pub local: (i64, i64),
    /// 值
    pub value: f64,
}

/// 单个子域上的字段分片
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShard {
    field: String,
    sdd: SubdomainId,
    size: (usize, usize),
    entries: Vec<ShardEntry>,
}

impl FieldShard {
    /// 创建空分片
    pub fn new(field: impl Into<String>, sdd: SubdomainId, size: (usize, usize)) -> Self {
        Self {
            field: field.into(),
            sdd,
            size,
            entries: Vec::new(),
        }
    }

    /// 追加条目
    pub fn push(&mut self, li: i64, lj: i64, value: f64) {
        self.entries.push(ShardEntry {
            local: (li, lj),
            value,
        });
    }

    /// 字段名
    #[inline]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// 所属子域
    #[inline]
    pub fn sdd(&self) -> SubdomainId {
        self.sdd
    }

    /// 子域声明尺寸
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// 条目
    #[inline]
    pub fn entries(&self) -> &[ShardEntry] {
        &self.entries
    }

    /// 条目数
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 某字段在全部子域上的分片，按子域标识索引
pub type ShardSet = Vec<Option<FieldShard>>;

// ============================================================
// 编解码器
// ============================================================

/// 场分片编解码器
#[derive(Debug, Clone, Copy)]
pub struct FieldShardCodec {
    strategy: ParallelStrategy,
    min_parallel_cells: usize,
}

impl Default for FieldShardCodec {
    fn default() -> Self {
        Self {
            strategy: ParallelStrategy::Auto,
            min_parallel_cells: 4096,
        }
    }
}

impl FieldShardCodec {
    /// 指定并行策略
    pub fn new(strategy: ParallelStrategy, min_parallel_cells: usize) -> Self {
        Self {
            strategy,
            min_parallel_cells,
        }
    }

    fn parallel(&self, work: usize) -> bool {
        self.strategy.should_parallelize(work, self.min_parallel_cells)
    }

    /// 拆分单个字段
    ///
    /// `field` 为 `None` 时返回全 `None` 的分片集合。
    pub fn split_field(
        &self,
        table: &PartitionTable,
        name: &str,
        field: Option<&Field>,
    ) -> GsResult<ShardSet> {
        let Some(field) = field else {
            debug!("字段 {} 缺失，不生成分片", name);
            return Ok(vec![None; table.subdomain_count()]);
        };
        GsError::check_size(name, table.cell_count(), field.len())?;

        let shards = table
            .layouts()
            .iter()
            .map(|layout| Some(split_one(layout, name, field)))
            .collect();
        Ok(shards)
    }

    /// 拆分集合中的全部字段，字段之间并行
    pub fn split_all(
        &self,
        table: &PartitionTable,
        fields: &FieldSet,
    ) -> GsResult<BTreeMap<String, ShardSet>> {
        let names: Vec<&str> = fields.names().collect();
        let split = |name: &&str| -> GsResult<(String, ShardSet)> {
            let shards = self.split_field(table, name, fields.field(name))?;
            Ok((name.to_string(), shards))
        };

        let pairs: Vec<(String, ShardSet)> = if self.parallel(table.cell_count() * names.len()) {
            names.par_iter().map(split).collect::<GsResult<_>>()?
        } else {
            names.iter().map(split).collect::<GsResult<_>>()?
        };
        Ok(pairs.into_iter().collect())
    }

    /// 合并单个字段
    ///
    /// `shards` 按子域标识索引，`None` 表示该子域没有此字段（按零处理）。
    pub fn merge_field(
        &self,
        table: &PartitionTable,
        name: &str,
        shards: &[Option<FieldShard>],
    ) -> GsResult<Field> {
        GsError::check_size(
            &format!("{} 的子域分片", name),
            table.subdomain_count(),
            shards.len(),
        )?;

        let decode = |(layout, shard): (&SubdomainLayout, &Option<FieldShard>)| {
            match shard {
                Some(shard) => decode_one(layout, name, shard),
                None => Ok((layout.id(), Vec::new())),
            }
        };
        let pairs = table.layouts().iter().zip(shards.iter());
        let decoded: Vec<(SubdomainId, Vec<(CellUid, f64)>)> = if self.parallel(table.cell_count()) {
            pairs
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(decode)
                .collect::<GsResult<_>>()?
        } else {
            pairs.map(decode).collect::<GsResult<_>>()?
        };

        let mut values = vec![0.0; table.cell_count()];
        let mut written = vec![false; table.cell_count()];
        for (sdd, list) in decoded {
            for (uid, value) in list {
                let slot = uid.get();
                GsError::check_index("Cell", slot, values.len())?;
                if written[slot] {
                    return Err(GsError::shape_mismatch(
                        sdd,
                        name,
                        format!("单元 {} 被重复写入", uid),
                    ));
                }
                written[slot] = true;
                values[slot] = value;
            }
        }

        let present = shards.iter().filter(|s| s.is_some()).count();
        debug!(
            "字段 {} 合并完成: {}/{} 个子域有分片",
            name,
            present,
            shards.len()
        );
        Ok(Field::from_values(name, values))
    }
}

fn split_one(layout: &SubdomainLayout, name: &str, field: &Field) -> FieldShard {
    let mut shard = FieldShard::new(name, layout.id(), layout.size());
    for (uid, li, lj) in layout.cells() {
        shard.push(li as i64, lj as i64, field.get(uid).unwrap_or(0.0));
    }
    shard
}

fn decode_one(
    layout: &SubdomainLayout,
    name: &str,
    shard: &FieldShard,
) -> GsResult<(SubdomainId, Vec<(CellUid, f64)>)> {
    let sdd = layout.id();
    ensure!(
        shard.size() == layout.size(),
        GsError::shape_mismatch(
            sdd,
            name,
            format!(
                "分片尺寸 {}x{} 与子域尺寸 {}x{} 不一致",
                shard.size().0,
                shard.size().1,
                layout.size().0,
                layout.size().1
            ),
        )
    );

    let mut out = Vec::with_capacity(shard.len());
    for entry in shard.entries() {
        let (li, lj) = entry.local;
        ensure!(
            layout.contains_local(li, lj),
            GsError::shape_mismatch(
                sdd,
                name,
                format!(
                    "局部坐标 ({}, {}) 超出 {}x{}",
                    li,
                    lj,
                    layout.size().0,
                    layout.size().1
                ),
            )
        );
        let uid = require!(
            layout.uid_at(li, lj),
            GsError::shape_mismatch(
                sdd,
                name,
                format!("局部坐标 ({}, {}) 未在坐标表中登记", li, lj),
            )
        );
        out.push((uid, entry.value));
    }
    Ok((sdd, out))
}
