// crates/gs_partition/src/router.rs

//! 边界条件路由
//!
//! 为每条全局边界记录确定需要接收它的子域，并把坐标平移到该子域的
//! 局部坐标系。
//!
//! # 算法
//!
//! 对坐标为 `(cx, cy)` 的记录：
//!
//! 1. 各轴独立夹到最近的内部单元得到 `(eqX, eqY)`，其拥有者为主拥有者，
//!    写入坐标 `(cx, cy) − 主拥有者原点`（可为负或超出子域尺寸）。
//! 2. 在越界的各轴上把夹紧坐标向越界方向推 L 格，按网格周期回绕，
//!    得到探测坐标，其拥有者为次拥有者。
//! 3. 次拥有者与主拥有者在 x、y 两个方向的子域序号都不同（对角相邻）
//!    时，再写一份平移到次拥有者局部坐标系的副本。
//!
//! 仅一条边越界的记录探测结果最多只在一个方向上不同，不会复制；
//! 角点记录在 Px>1 且 Py>1 时恰好落入两个子域。
//!
//! # 并发
//!
//! 每条记录独立计算，但多条记录可能写入同一子域，且由于角点复制，
//! 写入某子域的记录集合事先未知。每个子域持有一个 `parking_lot::Mutex`
//! 累加器，路由结束后按 `(uid, 坐标)` 排序，结果与调度无关。

use gs_config::ParallelStrategy;
use gs_foundation::prelude::*;
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;

use crate::boundary::BoundaryRecord;
use crate::coords::CoordinateSpace;
use crate::partitioner::PartitionTable;

/// 单条记录的路由结果
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// 主拥有者与平移后的记录
    pub primary: (SubdomainId, BoundaryRecord),
    /// 对角次拥有者与平移后的副本
    pub secondary: Option<(SubdomainId, BoundaryRecord)>,
}

impl Route {
    /// 目标子域数量（1 或 2）
    pub fn fan_out(&self) -> usize {
        1 + usize::from(self.secondary.is_some())
    }
}

/// 边界条件路由器
#[derive(Debug, Clone)]
pub struct BoundaryConditionRouter<'a> {
    table: &'a PartitionTable,
    strategy: ParallelStrategy,
    min_parallel_records: usize,
}

impl<'a> BoundaryConditionRouter<'a> {
    /// 默认的并行阈值（记录数）
    pub const DEFAULT_MIN_PARALLEL: usize = 1024;

    /// 创建路由器
    ///
    /// L>0 时要求子域在每个方向至少有 L 个单元，否则探测坐标可能
    /// 越过整个子域，返回 `Configuration` 错误。
    pub fn new(table: &'a PartitionTable) -> GsResult<Self> {
        let space = table.space();
        let l = space.ghost_layers();
        let (sdd_nx, sdd_ny) = space.subdomain_size();
        ensure!(
            l == 0 || (sdd_nx >= l && sdd_ny >= l),
            GsError::configuration(format!(
                "子域尺寸 {}x{} 小于 ghost 层数 {}",
                sdd_nx, sdd_ny, l
            ))
        );
        Ok(Self {
            table,
            strategy: ParallelStrategy::default(),
            min_parallel_records: Self::DEFAULT_MIN_PARALLEL,
        })
    }

    /// 设置并行策略
    pub fn with_strategy(mut self, strategy: ParallelStrategy, min_parallel_records: usize) -> Self {
        self.strategy = strategy;
        self.min_parallel_records = min_parallel_records;
        self
    }

    /// 计算单条记录的目标子域
    pub fn route_record(&self, record: &BoundaryRecord) -> GsResult<Route> {
        let space: &CoordinateSpace = self.table.space();
        let (cx, cy) = record.coord;
        space.check_ghost_range(cx, cy, &format!("边界记录 uid={}", record.uid))?;

        let (eq_x, eq_y) = space.clamp(cx, cy);
        let primary = space.owner(eq_x, eq_y);
        let primary_copy = record.translated(space.origin(primary));

        let (nx, ny) = space.grid_size();
        let l = space.ghost_layers() as i64;
        let across_x = step_across(eq_x, overflow(cx, nx), l, nx);
        let across_y = step_across(eq_y, overflow(cy, ny), l, ny);
        let secondary = space.owner(across_x, across_y);

        let (psx, psy) = space.subdomain_grid(primary);
        let (ssx, ssy) = space.subdomain_grid(secondary);
        let secondary = if psx != ssx && psy != ssy {
            Some((secondary, record.translated(space.origin(secondary))))
        } else {
            None
        };

        Ok(Route {
            primary: (primary, primary_copy),
            secondary,
        })
    }

    /// 路由全部记录，返回按子域标识索引的局部记录列表
    pub fn route(&self, records: &[BoundaryRecord]) -> GsResult<Vec<Vec<BoundaryRecord>>> {
        let accumulators: Vec<Mutex<Vec<BoundaryRecord>>> = (0..self.table.subdomain_count())
            .map(|_| Mutex::new(Vec::new()))
            .collect();

        let dispatch = |record: &BoundaryRecord| -> GsResult<()> {
            let route = self.route_record(record)?;
            let (sdd, copy) = route.primary;
            accumulators[sdd.get()].lock().push(copy);
            if let Some((sdd, copy)) = route.secondary {
                accumulators[sdd.get()].lock().push(copy);
            }
            Ok(())
        };

        if self
            .strategy
            .should_parallelize(records.len(), self.min_parallel_records)
        {
            records.par_iter().try_for_each(dispatch)?;
        } else {
            records.iter().try_for_each(dispatch)?;
        }

        let routed: Vec<Vec<BoundaryRecord>> = accumulators
            .into_iter()
            .map(|acc| {
                let mut list = acc.into_inner();
                list.sort_by_key(|r| (r.uid, r.coord));
                list
            })
            .collect();

        let copies: usize = routed.iter().map(Vec::len).sum();
        debug!(
            "边界路由完成: {} 条记录, {} 份副本 (角点复制 {} 份)",
            records.len(),
            copies,
            copies.saturating_sub(records.len())
        );
        Ok(routed)
    }
}

/// 越界方向: 低侧 -1，高侧 +1，范围内 0
#[inline]
fn overflow(c: i64, n: usize) -> i64 {
    if c < 0 {
        -1
    } else if c >= n as i64 {
        1
    } else {
        0
    }
}

/// 夹紧坐标向越界方向推 L 格并周期回绕
#[inline]
fn step_across(clamped: usize, direction: i64, l: i64, n: usize) -> usize {
    (clamped as i64 + direction * l).rem_euclid(n as i64) as usize
}
