// crates/gs_partition/src/partitioner.rs

//! 网格划分
//!
//! `GridPartitioner` 对每个全局单元计算拥有子域与局部坐标，生成
//! `PartitionTable`。划分是均匀网格，每个单元 O(1)，无需搜索结构。
//!
//! `PartitionTable` 同时保存正向映射（uid → 子域、局部坐标）与
//! 每个子域的反向映射（局部坐标 → uid）。合并时反向映射从磁盘上的
//! `sdd.dat` 重建，见 [`PartitionTable::from_layouts`]。

use gs_foundation::prelude::*;
use tracing::debug;

use crate::coords::{CoordinateSpace, GlobalDomain};

/// 单元的归属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPlacement {
    /// 拥有子域
    pub sdd: SubdomainId,
    /// 子域内局部坐标
    pub local: (usize, usize),
}

// ============================================================
// 子域布局
// ============================================================

/// 单个子域的坐标表
#[derive(Debug, Clone, PartialEq)]
pub struct SubdomainLayout {
    id: SubdomainId,
    origin: (usize, usize),
    size: (usize, usize),
    local_to_uid: Vec<Option<CellUid>>,
    filled: usize,
}

impl SubdomainLayout {
    /// 创建空布局
    pub fn new(id: SubdomainId, origin: (usize, usize), size: (usize, usize)) -> Self {
        Self {
            id,
            origin,
            size,
            local_to_uid: vec![None; size.0 * size.1],
            filled: 0,
        }
    }

    /// 子域标识
    #[inline]
    pub fn id(&self) -> SubdomainId {
        self.id
    }

    /// 原点 `(BL_X, BL_Y)`
    #[inline]
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// 尺寸 `(SDD_Nx, SDD_Ny)`
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// 已登记单元数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.filled
    }

    /// 每个局部坐标是否都已登记
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.filled == self.local_to_uid.len()
    }

    /// 局部坐标是否在声明尺寸内
    #[inline]
    pub fn contains_local(&self, li: i64, lj: i64) -> bool {
        li >= 0 && lj >= 0 && (li as usize) < self.size.0 && (lj as usize) < self.size.1
    }

    /// 登记单元，坐标越出尺寸或重复登记时返回 `ShapeMismatch`
    pub fn insert(&mut self, uid: CellUid, li: i64, lj: i64) -> GsResult<()> {
        ensure!(
            self.contains_local(li, lj),
            GsError::shape_mismatch(
                self.id,
                "sdd",
                format!(
                    "单元 {} 的局部坐标 ({}, {}) 超出 {}x{}",
                    uid, li, lj, self.size.0, self.size.1
                ),
            )
        );
        let slot = li as usize + lj as usize * self.size.0;
        if let Some(existing) = self.local_to_uid[slot] {
            return Err(GsError::shape_mismatch(
                self.id,
                "sdd",
                format!("局部坐标 ({}, {}) 同时登记了 {} 和 {}", li, lj, existing, uid),
            ));
        }
        self.local_to_uid[slot] = Some(uid);
        self.filled += 1;
        Ok(())
    }

    /// 局部坐标对应的全局标识
    #[inline]
    pub fn uid_at(&self, li: i64, lj: i64) -> Option<CellUid> {
        if self.contains_local(li, lj) {
            self.local_to_uid[li as usize + lj as usize * self.size.0]
        } else {
            None
        }
    }

    /// 按局部行优先顺序遍历 `(uid, li, lj)`
    pub fn cells(&self) -> impl Iterator<Item = (CellUid, usize, usize)> + '_ {
        let width = self.size.0;
        self.local_to_uid
            .iter()
            .enumerate()
            .filter_map(move |(slot, uid)| uid.map(|u| (u, slot % width, slot / width)))
    }

    /// 局部坐标转全局坐标
    #[inline]
    pub fn to_global(&self, li: usize, lj: usize) -> (usize, usize) {
        (self.origin.0 + li, self.origin.1 + lj)
    }
}

// ============================================================
// 分区表
// ============================================================

/// 分区表，由 `GridPartitioner` 生成后只读
#[derive(Debug, Clone)]
pub struct PartitionTable {
    space: CoordinateSpace,
    placements: Vec<CellPlacement>,
    layouts: Vec<SubdomainLayout>,
}

impl PartitionTable {
    /// 由各子域布局重建分区表
    ///
    /// 检查布局与坐标空间一致、每个 uid 恰好属于一个子域。
    pub fn from_layouts(space: CoordinateSpace, layouts: Vec<SubdomainLayout>) -> GsResult<Self> {
        GsError::check_size("子域布局", space.subdomain_count(), layouts.len())?;

        let n = space.cell_count();
        let mut placements: Vec<Option<CellPlacement>> = vec![None; n];
        for (k, layout) in layouts.iter().enumerate() {
            let id = layout.id();
            ensure!(
                id.get() == k,
                GsError::invalid_input(format!("第 {} 个布局的子域标识为 {}", k, id))
            );
            ensure!(
                layout.origin() == space.origin(id) && layout.size() == space.subdomain_size(),
                GsError::shape_mismatch(
                    id,
                    "sdd",
                    format!(
                        "原点 {:?} 尺寸 {:?} 与分区 {:?}/{:?} 不一致",
                        layout.origin(),
                        layout.size(),
                        space.origin(id),
                        space.subdomain_size()
                    ),
                )
            );
            for (uid, li, lj) in layout.cells() {
                GsError::check_index("Cell", uid.get(), n)?;
                if let Some(prev) = placements[uid.get()] {
                    return Err(GsError::invalid_input(format!(
                        "单元 {} 同时属于子域 {} 和 {}",
                        uid, prev.sdd, id
                    )));
                }
                placements[uid.get()] = Some(CellPlacement {
                    sdd: id,
                    local: (li, lj),
                });
            }
        }

        let placements = placements
            .into_iter()
            .enumerate()
            .map(|(uid, p)| {
                p.ok_or_else(|| GsError::invalid_input(format!("单元 {} 未被任何子域拥有", uid)))
            })
            .collect::<GsResult<Vec<_>>>()?;

        Ok(Self {
            space,
            placements,
            layouts,
        })
    }

    /// 坐标空间
    #[inline]
    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// 内部单元数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.placements.len()
    }

    /// 子域数
    #[inline]
    pub fn subdomain_count(&self) -> usize {
        self.layouts.len()
    }

    /// 单元归属
    pub fn placement(&self, uid: CellUid) -> GsResult<CellPlacement> {
        GsError::check_index("Cell", uid.get(), self.placements.len())?;
        Ok(self.placements[uid.get()])
    }

    /// 全部子域布局，按标识递增
    #[inline]
    pub fn layouts(&self) -> &[SubdomainLayout] {
        &self.layouts
    }

    /// 单个子域布局
    pub fn layout(&self, sdd: SubdomainId) -> GsResult<&SubdomainLayout> {
        self.space.check_subdomain(sdd)?;
        Ok(&self.layouts[sdd.get()])
    }
}

// ============================================================
// 划分器
// ============================================================

/// 均匀矩形网格划分器
#[derive(Debug, Clone)]
pub struct GridPartitioner {
    space: CoordinateSpace,
}

impl GridPartitioner {
    /// 创建划分器，分区形状不合法时返回 `Configuration` 错误
    pub fn new(domain: &GlobalDomain) -> GsResult<Self> {
        Ok(Self {
            space: CoordinateSpace::new(domain)?,
        })
    }

    /// 坐标空间
    #[inline]
    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    /// 计算单个内部坐标的归属
    ///
    /// ghost 坐标必须通过边界路由处理，这里返回 `OutOfRange`。
    pub fn locate(&self, x: i64, y: i64) -> GsResult<CellPlacement> {
        let (i, j) = self.space.check_interior(x, y, "网格划分")?;
        let sdd = self.space.owner(i, j);
        let (ox, oy) = self.space.origin(sdd);
        Ok(CellPlacement {
            sdd,
            local: (i - ox, j - oy),
        })
    }

    /// 按恒等枚举划分整个网格
    pub fn partition(&self) -> GsResult<PartitionTable> {
        let (nx, ny) = self.space.grid_size();
        let coords = (0..ny).flat_map(|j| (0..nx).map(move |i| (i as i64, j as i64)));
        self.build(coords)
    }

    /// 按给定的全局坐标集合划分
    ///
    /// 坐标集合必须恰好覆盖整个网格。
    pub fn partition_coords(&self, coords: &[(i64, i64)]) -> GsResult<PartitionTable> {
        GsError::check_size("全局坐标", self.space.cell_count(), coords.len())?;
        self.build(coords.iter().copied())
    }

    fn build(&self, coords: impl Iterator<Item = (i64, i64)>) -> GsResult<PartitionTable> {
        let mut layouts: Vec<SubdomainLayout> = (0..self.space.subdomain_count())
            .map(|k| {
                let id = SubdomainId::new(k);
                SubdomainLayout::new(id, self.space.origin(id), self.space.subdomain_size())
            })
            .collect();

        for (x, y) in coords {
            let placement = self.locate(x, y)?;
            let (i, j) = (x as usize, y as usize);
            let (li, lj) = placement.local;
            layouts[placement.sdd.get()].insert(self.space.uid(i, j), li as i64, lj as i64)?;
        }

        let (px, py) = self.space.partition_shape();
        debug!(
            "网格划分完成: {} 个单元, {}x{} 个子域",
            self.space.cell_count(),
            px,
            py
        );
        PartitionTable::from_layouts(self.space, layouts)
    }
}
