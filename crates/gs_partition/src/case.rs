// crates/gs_partition/src/case.rs

//! 算例定义
//!
//! 算例向拆分流程提供全局域、初始场与全局边界记录。核心不生成物理量，
//! 只通过 [`CaseDefinition`] 接口消费它们。
//!
//! 内置算例：
//!
//! - [`Sod2D`]: 二维象限激波管，四周反射壁面
//! - [`PeriodicTransport`]: 全周期边界上的正弦密度输运

use gs_foundation::prelude::*;
use std::f64::consts::PI;

use crate::boundary::{BcKind, BoundaryRecord, BoundaryRecordSet, FieldValues};
use crate::coords::{CoordinateSpace, GlobalDomain};
use crate::field::{Field, FieldSet};

/// 算例接口
pub trait CaseDefinition: Send + Sync {
    /// 算例名
    fn name(&self) -> &str;

    /// 全局域（分区形状由调用方另行设置）
    fn domain(&self) -> GlobalDomain;

    /// 初始场
    fn fields(&self) -> GsResult<FieldSet>;

    /// 全局边界记录
    fn boundary_records(&self) -> GsResult<BoundaryRecordSet>;
}

/// 内置算例名
pub const BUILTIN_CASES: &[&str] = &["sod2d", "periodic"];

/// 按名称构造内置算例
pub fn builtin_case(name: &str, domain: GlobalDomain) -> GsResult<Box<dyn CaseDefinition>> {
    match name.to_lowercase().as_str() {
        "sod2d" | "sod" => Ok(Box::new(Sod2D::new(domain))),
        "periodic" => Ok(Box::new(PeriodicTransport::new(domain))),
        other => Err(GsError::not_found(format!(
            "算例 '{}' (可用: {})",
            other,
            BUILTIN_CASES.join(", ")
        ))),
    }
}

/// 单元中心坐标
fn cell_center(domain: &GlobalDomain, i: usize, j: usize) -> (f64, f64) {
    (
        (i as f64 + 0.5) * domain.dx(),
        (j as f64 + 0.5) * domain.dy(),
    )
}

// ============================================================
// Sod 激波管
// ============================================================

/// 二维 Sod 激波管
///
/// 左下象限 `i ≤ Nx/2 且 j ≤ Ny/2` 为高压区（ρ=1, p=1），
/// 其余为低压区（ρ=0.125, p=0.1），初始静止。
#[derive(Debug, Clone)]
pub struct Sod2D {
    domain: GlobalDomain,
}

impl Sod2D {
    /// 比热比
    pub const GAMMA: f64 = 1.4;

    /// 创建算例
    pub fn new(domain: GlobalDomain) -> Self {
        Self { domain }
    }

    fn is_high_pressure(&self, i: usize, j: usize) -> bool {
        i <= self.domain.nx / 2 && j <= self.domain.ny / 2
    }
}

impl CaseDefinition for Sod2D {
    fn name(&self) -> &str {
        "sod2d"
    }

    fn domain(&self) -> GlobalDomain {
        self.domain
    }

    fn fields(&self) -> GsResult<FieldSet> {
        let space = CoordinateSpace::new(&self.domain)?;
        let n = space.cell_count();
        let high = |uid: CellUid| -> bool {
            let (i, j) = (uid.get() % self.domain.nx, uid.get() / self.domain.nx);
            self.is_high_pressure(i, j)
        };

        let mut set = FieldSet::new(n);
        set.insert(Field::from_fn("rho", n, |u| if high(u) { 1.0 } else { 0.125 }))?;
        set.insert(Field::from_fn("rhoE", n, |u| {
            let p = if high(u) { 1.0 } else { 0.1 };
            p / (Self::GAMMA - 1.0)
        }))?;
        set.declare_absent("rhou_x");
        set.declare_absent("rhou_y");
        Ok(set)
    }

    fn boundary_records(&self) -> GsResult<BoundaryRecordSet> {
        let space = CoordinateSpace::new(&self.domain)?;
        let (nx, ny) = (self.domain.nx as i64, self.domain.ny as i64);
        BoundaryRecord::ring(&space, |x, y| {
            let flip_x = x < 0 || x >= nx;
            let flip_y = y < 0 || y >= ny;
            BcKind::Neumann {
                coefficients: FieldValues::new()
                    .with("rho", 1.0)
                    .with("rhoE", 1.0)
                    .with("rhou_x", if flip_x { -1.0 } else { 1.0 })
                    .with("rhou_y", if flip_y { -1.0 } else { 1.0 }),
            }
        })
    }
}

// ============================================================
// 周期输运
// ============================================================

/// 周期边界上的正弦密度输运
///
/// `ρ = 1 + ½·sin(2πx/lx)·sin(2πy/ly)`，速度 `(u, v)` 恒定。
#[derive(Debug, Clone)]
pub struct PeriodicTransport {
    domain: GlobalDomain,
}

impl PeriodicTransport {
    /// 输运速度
    pub const VELOCITY: (f64, f64) = (1.0, 0.5);

    /// 创建算例
    pub fn new(domain: GlobalDomain) -> Self {
        Self { domain }
    }

    fn density(&self, uid: CellUid) -> f64 {
        let (i, j) = (uid.get() % self.domain.nx, uid.get() / self.domain.nx);
        let (x, y) = cell_center(&self.domain, i, j);
        1.0 + 0.5 * (2.0 * PI * x / self.domain.lx).sin() * (2.0 * PI * y / self.domain.ly).sin()
    }
}

impl CaseDefinition for PeriodicTransport {
    fn name(&self) -> &str {
        "periodic"
    }

    fn domain(&self) -> GlobalDomain {
        self.domain
    }

    fn fields(&self) -> GsResult<FieldSet> {
        let n = CoordinateSpace::new(&self.domain)?.cell_count();
        let (u, v) = Self::VELOCITY;
        let mut set = FieldSet::new(n);
        set.insert(Field::from_fn("rho", n, |uid| self.density(uid)))?;
        set.insert(Field::from_fn("rhou_x", n, |uid| self.density(uid) * u))?;
        set.insert(Field::from_fn("rhou_y", n, |uid| self.density(uid) * v))?;
        Ok(set)
    }

    fn boundary_records(&self) -> GsResult<BoundaryRecordSet> {
        let space = CoordinateSpace::new(&self.domain)?;
        BoundaryRecord::ring(&space, |_, _| BcKind::Periodic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sod_quadrants() {
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 4, 4));
        let fields = case.fields().unwrap();
        let rho = fields.field("rho").unwrap();
        // (2,2) 仍属高压区，(3,0) 与 (0,3) 不属于
        assert_eq!(rho.get(CellUid::new(2 + 2 * 4)), Some(1.0));
        assert_eq!(rho.get(CellUid::new(3)), Some(0.125));
        assert_eq!(rho.get(CellUid::new(12)), Some(0.125));
        let rho_e = fields.field("rhoE").unwrap();
        assert!((rho_e.get(CellUid::new(0)).unwrap() - 2.5).abs() < 1e-12);
        assert!(fields.is_absent("rhou_x"));
    }

    #[test]
    fn test_sod_wall_coefficients() {
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 4, 4));
        let records = case.boundary_records().unwrap();
        assert_eq!(records.len(), 20);

        let left = records.iter().find(|r| r.coord == (-1, 2)).unwrap();
        let payload = left.kind.payload().unwrap();
        assert_eq!(payload.get("rhou_x"), Some(-1.0));
        assert_eq!(payload.get("rhou_y"), Some(1.0));

        let corner = records.iter().find(|r| r.coord == (4, -1)).unwrap();
        let payload = corner.kind.payload().unwrap();
        assert_eq!(payload.get("rhou_x"), Some(-1.0));
        assert_eq!(payload.get("rhou_y"), Some(-1.0));
    }

    #[test]
    fn test_periodic_case() {
        let case = PeriodicTransport::new(GlobalDomain::new(2.0, 1.0, 8, 4));
        let fields = case.fields().unwrap();
        assert_eq!(fields.len(), 3);
        let records = case.boundary_records().unwrap();
        assert!(records.iter().all(|r| r.kind == BcKind::Periodic));
    }

    #[test]
    fn test_builtin_lookup() {
        let domain = GlobalDomain::new(1.0, 1.0, 2, 2);
        assert_eq!(builtin_case("Sod2D", domain).unwrap().name(), "sod2d");
        assert!(builtin_case("dambreak", domain).is_err());
    }
}
