// crates/gs_partition/src/coords.rs

//! 坐标空间
//!
//! 定义全局域 `GlobalDomain` 以及全局/局部坐标映射与单元编号规则：
//!
//! - 内部单元 `(i, j)`，`0 ≤ i < Nx`，`0 ≤ j < Ny`，`uid = i + j·Nx`
//! - 子域 `(sx, sy)` 拥有 `i ∈ [sx·SDD_Nx, (sx+1)·SDD_Nx)`、
//!   `j ∈ [sy·SDD_Ny, (sy+1)·SDD_Ny)`，局部坐标 = 全局坐标 − 原点
//! - ghost 单元位于内部区域外 L 层环带内，编号从 `Nx·Ny` 开始逐环递增
//!
//! # ghost 环编号
//!
//! 第 k 环（k = 1..=L）按以下顺序编号：
//!
//! ```text
//! 左边  (-k, j)        j = -k .. Ny-1+k  (不含上端)
//! 上边  (i, Ny-1+k)    i = -k .. Nx-1+k  (不含右端)
//! 右边  (Nx-1+k, j)    j = Ny-1+k 递减到 -k+1
//! 下边  (i, -k)        i = Nx-1+k 递减到 -k+1
//! ```
//!
//! 每个角点恰好出现一次，第 k 环共 `2(Nx+Ny) + 4(2k-1)` 个单元。

use gs_foundation::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================
// 全局域
// ============================================================

/// 全局计算域，单次拆分/合并期间不可变
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalDomain {
    /// x 方向物理长度
    pub lx: f64,
    /// y 方向物理长度
    pub ly: f64,
    /// x 方向单元数
    pub nx: usize,
    /// y 方向单元数
    pub ny: usize,
    /// x 方向子域数
    pub px: usize,
    /// y 方向子域数
    pub py: usize,
    /// ghost 层数 L
    pub ghost_layers: usize,
}

impl GlobalDomain {
    /// 创建单子域、单层 ghost 的全局域
    pub fn new(lx: f64, ly: f64, nx: usize, ny: usize) -> Self {
        Self {
            lx,
            ly,
            nx,
            ny,
            px: 1,
            py: 1,
            ghost_layers: 1,
        }
    }

    /// 设置分区形状
    pub fn with_partition(mut self, px: usize, py: usize) -> Self {
        self.px = px;
        self.py = py;
        self
    }

    /// 设置 ghost 层数
    pub fn with_ghost_layers(mut self, ghost_layers: usize) -> Self {
        self.ghost_layers = ghost_layers;
        self
    }

    /// 检查尺寸为正且分区形状可整除
    pub fn validate(&self) -> GsResult<()> {
        ensure!(
            self.nx > 0 && self.ny > 0,
            GsError::configuration(format!("网格尺寸必须为正: Nx={}, Ny={}", self.nx, self.ny))
        );
        ensure!(
            self.px > 0 && self.py > 0,
            GsError::configuration(format!("分区形状必须为正: Px={}, Py={}", self.px, self.py))
        );
        ensure!(
            self.nx % self.px == 0,
            GsError::configuration(format!("Nx={} 不能被 Px={} 整除", self.nx, self.px))
        );
        ensure!(
            self.ny % self.py == 0,
            GsError::configuration(format!("Ny={} 不能被 Py={} 整除", self.ny, self.py))
        );
        ensure!(
            self.lx.is_finite() && self.lx > 0.0 && self.ly.is_finite() && self.ly > 0.0,
            GsError::configuration(format!("物理尺寸必须为正: lx={}, ly={}", self.lx, self.ly))
        );
        Ok(())
    }

    /// 内部单元总数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    /// 子域总数
    #[inline]
    pub fn subdomain_count(&self) -> usize {
        self.px * self.py
    }

    /// x 方向网格间距
    pub fn dx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    /// y 方向网格间距
    pub fn dy(&self) -> f64 {
        self.ly / self.ny as f64
    }
}

// ============================================================
// 坐标空间
// ============================================================

/// 坐标空间：编号规则与全局/局部坐标变换
///
/// 只能由通过验证的 `GlobalDomain` 构造，因此内部各除法都是整除。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateSpace {
    nx: usize,
    ny: usize,
    px: usize,
    py: usize,
    sdd_nx: usize,
    sdd_ny: usize,
    ghost_layers: usize,
}

impl CoordinateSpace {
    /// 由全局域构造
    pub fn new(domain: &GlobalDomain) -> GsResult<Self> {
        domain.validate()?;
        Ok(Self {
            nx: domain.nx,
            ny: domain.ny,
            px: domain.px,
            py: domain.py,
            sdd_nx: domain.nx / domain.px,
            sdd_ny: domain.ny / domain.py,
            ghost_layers: domain.ghost_layers,
        })
    }

    /// 全局网格尺寸 `(Nx, Ny)`
    #[inline]
    pub fn grid_size(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// 分区形状 `(Px, Py)`
    #[inline]
    pub fn partition_shape(&self) -> (usize, usize) {
        (self.px, self.py)
    }

    /// 子域尺寸 `(SDD_Nx, SDD_Ny)`
    #[inline]
    pub fn subdomain_size(&self) -> (usize, usize) {
        (self.sdd_nx, self.sdd_ny)
    }

    /// ghost 层数
    #[inline]
    pub fn ghost_layers(&self) -> usize {
        self.ghost_layers
    }

    /// 内部单元总数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    /// 子域总数
    #[inline]
    pub fn subdomain_count(&self) -> usize {
        self.px * self.py
    }

    // --------------------------------------------------------
    // 内部单元
    // --------------------------------------------------------

    /// 内部单元标识，`uid = i + j·Nx`
    #[inline]
    pub fn uid(&self, i: usize, j: usize) -> CellUid {
        CellUid::new(i + j * self.nx)
    }

    /// 由标识反求内部坐标
    pub fn coord_of(&self, uid: CellUid) -> GsResult<(usize, usize)> {
        GsError::check_index("Cell", uid.get(), self.cell_count())?;
        Ok((uid.get() % self.nx, uid.get() / self.nx))
    }

    /// 坐标是否位于内部区域
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.nx as i64 && y < self.ny as i64
    }

    /// 坐标是否位于内部区域或 L 层 ghost 环内
    #[inline]
    pub fn within_ghost_range(&self, x: i64, y: i64) -> bool {
        let l = self.ghost_layers as i64;
        x >= -l && y >= -l && x < self.nx as i64 + l && y < self.ny as i64 + l
    }

    /// 检查内部坐标，越界时返回 `OutOfRange`
    pub fn check_interior(&self, x: i64, y: i64, context: &str) -> GsResult<(usize, usize)> {
        if self.contains(x, y) {
            Ok((x as usize, y as usize))
        } else {
            Err(GsError::out_of_range(
                context,
                (x, y),
                (0, self.nx as i64),
                (0, self.ny as i64),
            ))
        }
    }

    /// 检查坐标位于 ghost 范围内，越界时返回 `OutOfRange`
    pub fn check_ghost_range(&self, x: i64, y: i64, context: &str) -> GsResult<()> {
        if self.within_ghost_range(x, y) {
            Ok(())
        } else {
            let l = self.ghost_layers as i64;
            Err(GsError::out_of_range(
                context,
                (x, y),
                (-l, self.nx as i64 + l),
                (-l, self.ny as i64 + l),
            ))
        }
    }

    /// 把坐标夹到最近的内部单元
    #[inline]
    pub fn clamp(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.clamp(0, self.nx as i64 - 1) as usize,
            y.clamp(0, self.ny as i64 - 1) as usize,
        )
    }

    // --------------------------------------------------------
    // 子域
    // --------------------------------------------------------

    /// 内部单元的拥有子域
    #[inline]
    pub fn owner(&self, i: usize, j: usize) -> SubdomainId {
        SubdomainId::from_grid(i / self.sdd_nx, j / self.sdd_ny, self.px)
    }

    /// 子域网格坐标 `(sx, sy)`
    #[inline]
    pub fn subdomain_grid(&self, sdd: SubdomainId) -> (usize, usize) {
        sdd.grid(self.px)
    }

    /// 子域原点 `(BL_X, BL_Y)`
    #[inline]
    pub fn origin(&self, sdd: SubdomainId) -> (usize, usize) {
        let (sx, sy) = self.subdomain_grid(sdd);
        (sx * self.sdd_nx, sy * self.sdd_ny)
    }

    /// 全局坐标转为子域局部坐标，可为负或超出子域尺寸
    #[inline]
    pub fn to_local(&self, sdd: SubdomainId, x: i64, y: i64) -> (i64, i64) {
        let (ox, oy) = self.origin(sdd);
        (x - ox as i64, y - oy as i64)
    }

    /// 局部坐标转回全局坐标
    #[inline]
    pub fn to_global(&self, sdd: SubdomainId, li: i64, lj: i64) -> (i64, i64) {
        let (ox, oy) = self.origin(sdd);
        (li + ox as i64, lj + oy as i64)
    }

    /// 检查子域标识有效
    pub fn check_subdomain(&self, sdd: SubdomainId) -> GsResult<()> {
        GsError::check_index("Subdomain", sdd.get(), self.subdomain_count())
    }

    // --------------------------------------------------------
    // ghost 单元
    // --------------------------------------------------------

    /// ghost 总数
    pub fn ghost_count(&self) -> usize {
        (1..=self.ghost_layers).map(|k| self.ring_len(k)).sum()
    }

    /// 第 k 环单元数
    #[inline]
    pub fn ring_len(&self, k: usize) -> usize {
        2 * (self.nx + self.ny) + 4 * (2 * k - 1)
    }

    /// 坐标所在 ghost 环序号，内部坐标返回 0
    #[inline]
    pub fn ring_of(&self, x: i64, y: i64) -> usize {
        let (nx, ny) = (self.nx as i64, self.ny as i64);
        (-x).max(x - (nx - 1)).max(-y).max(y - (ny - 1)).max(0) as usize
    }

    /// ghost 单元标识
    pub fn ghost_uid(&self, x: i64, y: i64) -> GsResult<CellUid> {
        self.check_ghost_range(x, y, "ghost 单元")?;
        let ring = self.ring_of(x, y);
        ensure!(
            ring > 0,
            GsError::invalid_input(format!("({}, {}) 是内部单元，没有 ghost 编号", x, y))
        );

        let (nx, ny, k) = (self.nx as i64, self.ny as i64, ring as i64);
        let side_v = ny + 2 * k - 1;
        let side_h = nx + 2 * k - 1;
        let offset = if x == -k && y < ny - 1 + k {
            y + k
        } else if y == ny - 1 + k && x < nx - 1 + k {
            side_v + x + k
        } else if x == nx - 1 + k && y > -k {
            side_v + side_h + (ny - 1 + k - y)
        } else {
            2 * side_v + side_h + (nx - 1 + k - x)
        };

        let base = self.cell_count() + (1..ring).map(|m| self.ring_len(m)).sum::<usize>();
        Ok(CellUid::new(base + offset as usize))
    }

    /// 由 ghost 标识反求坐标
    pub fn ghost_coord(&self, uid: CellUid) -> GsResult<(i64, i64)> {
        let total = self.cell_count() + self.ghost_count();
        ensure!(
            uid.get() >= self.cell_count() && uid.get() < total,
            GsError::index_out_of_bounds("Ghost", uid.get(), total)
        );

        let mut rest = uid.get() - self.cell_count();
        let mut ring = 1;
        while rest >= self.ring_len(ring) {
            rest -= self.ring_len(ring);
            ring += 1;
        }

        let (nx, ny, k) = (self.nx as i64, self.ny as i64, ring as i64);
        let side_v = ny + 2 * k - 1;
        let side_h = nx + 2 * k - 1;
        let mut u = rest as i64;
        if u < side_v {
            return Ok((-k, u - k));
        }
        u -= side_v;
        if u < side_h {
            return Ok((u - k, ny - 1 + k));
        }
        u -= side_h;
        if u < side_v {
            return Ok((nx - 1 + k, ny - 1 + k - u));
        }
        u -= side_v;
        Ok((nx - 1 + k - u, -k))
    }

    /// 全部 ghost 坐标，按标识递增排列
    pub fn ghost_coords(&self) -> GsResult<Vec<(i64, i64)>> {
        let start = self.cell_count();
        (start..start + self.ghost_count())
            .map(|u| self.ghost_coord(CellUid::new(u)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn space(nx: usize, ny: usize, px: usize, py: usize, l: usize) -> CoordinateSpace {
        let domain = GlobalDomain::new(1.0, 1.0, nx, ny)
            .with_partition(px, py)
            .with_ghost_layers(l);
        CoordinateSpace::new(&domain).unwrap()
    }

    #[test]
    fn test_uid_is_row_major() {
        let s = space(4, 3, 1, 1, 1);
        assert_eq!(s.uid(0, 0).get(), 0);
        assert_eq!(s.uid(3, 0).get(), 3);
        assert_eq!(s.uid(1, 2).get(), 9);
        assert_eq!(s.coord_of(CellUid::new(9)).unwrap(), (1, 2));
        assert!(s.coord_of(CellUid::new(12)).is_err());
    }

    #[test]
    fn test_non_divisible_rejected() {
        let domain = GlobalDomain::new(1.0, 1.0, 100, 10).with_partition(3, 1);
        let err = CoordinateSpace::new(&domain).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_size_rejected() {
        let domain = GlobalDomain::new(1.0, 1.0, 0, 10);
        assert!(CoordinateSpace::new(&domain).unwrap_err().is_configuration());
        let domain = GlobalDomain::new(1.0, 1.0, 4, 4).with_partition(0, 1);
        assert!(CoordinateSpace::new(&domain).unwrap_err().is_configuration());
    }

    #[test]
    fn test_owner_and_local() {
        let s = space(4, 4, 2, 2, 1);
        let sdd = s.owner(3, 1);
        assert_eq!(sdd.get(), 1);
        assert_eq!(s.origin(sdd), (2, 0));
        assert_eq!(s.to_local(sdd, 3, 1), (1, 1));
        assert_eq!(s.to_global(sdd, 1, 1), (3, 1));
        assert_eq!(s.to_local(sdd, 4, -1), (2, -1));
    }

    #[test]
    fn test_clamp() {
        let s = space(4, 4, 1, 1, 2);
        assert_eq!(s.clamp(-2, 5), (0, 3));
        assert_eq!(s.clamp(2, 1), (2, 1));
    }

    #[test]
    fn test_ghost_numbering_single_ring() {
        let s = space(2, 2, 1, 1, 1);
        // 左边 (-1,-1),(-1,0),(-1,1)
        assert_eq!(s.ghost_uid(-1, -1).unwrap().get(), 4);
        assert_eq!(s.ghost_uid(-1, 1).unwrap().get(), 6);
        // 上边 (-1,2),(0,2),(1,2)
        assert_eq!(s.ghost_uid(-1, 2).unwrap().get(), 7);
        assert_eq!(s.ghost_uid(1, 2).unwrap().get(), 9);
        // 右边 (2,2),(2,1),(2,0)
        assert_eq!(s.ghost_uid(2, 2).unwrap().get(), 10);
        assert_eq!(s.ghost_uid(2, 0).unwrap().get(), 12);
        // 下边 (2,-1),(1,-1),(0,-1)
        assert_eq!(s.ghost_uid(2, -1).unwrap().get(), 13);
        assert_eq!(s.ghost_uid(0, -1).unwrap().get(), 15);
        assert_eq!(s.ghost_count(), 12);
    }

    #[test]
    fn test_ghost_numbering_is_bijective() {
        let s = space(5, 3, 1, 1, 3);
        let coords = s.ghost_coords().unwrap();
        assert_eq!(coords.len(), s.ghost_count());

        let unique: HashSet<_> = coords.iter().copied().collect();
        assert_eq!(unique.len(), coords.len());

        for (offset, &(x, y)) in coords.iter().enumerate() {
            assert!(!s.contains(x, y));
            assert!(s.within_ghost_range(x, y));
            assert_eq!(s.ghost_uid(x, y).unwrap().get(), s.cell_count() + offset);
        }
    }

    #[test]
    fn test_ghost_out_of_range() {
        let s = space(4, 4, 1, 1, 1);
        assert!(s.ghost_uid(-2, 0).unwrap_err().is_out_of_range());
        assert!(s.ghost_uid(1, 1).is_err());
        assert!(s.ghost_coord(CellUid::new(3)).is_err());
        assert!(s.ghost_coord(CellUid::new(16 + 20)).is_err());
    }
}
