// crates/gs_foundation/src/ids.rs

//! 强类型标识
//!
//! 单元全局标识 `CellUid` 与子域标识 `SubdomainId` 都是 `usize` 的新类型，
//! 编译期防止把单元编号当作子域编号使用。
//!
//! ```
//! use gs_foundation::ids::{CellUid, SubdomainId};
//!
//! let uid = CellUid::new(5);
//! let sdd = SubdomainId::from_grid(1, 1, 2);
//! assert_eq!(uid.get(), 5);
//! assert_eq!(sdd.get(), 3);
//! assert_eq!(sdd.dir_name(), "sdd3");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// 单元标识
// ============================================================================

/// 全局单元标识
///
/// 内部单元满足 `uid = i + j·Nx`，ghost 单元编号从 `Nx·Ny` 开始逐环递增。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellUid(usize);

impl CellUid {
    /// 创建标识
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// 原始值
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for CellUid {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

// ============================================================================
// 子域标识
// ============================================================================

/// 子域线性标识 `sid = sy·Px + sx`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubdomainId(usize);

impl SubdomainId {
    /// 创建标识
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// 由子域网格坐标构造
    #[inline]
    pub const fn from_grid(sx: usize, sy: usize, px: usize) -> Self {
        Self(sy * px + sx)
    }

    /// 原始值
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// 子域网格坐标 `(sx, sy)`
    #[inline]
    pub const fn grid(self, px: usize) -> (usize, usize) {
        (self.0 % px, self.0 / px)
    }

    /// 磁盘目录名 `sdd<sid>`
    pub fn dir_name(self) -> String {
        format!("sdd{}", self.0)
    }
}

impl fmt::Display for SubdomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_grid_roundtrip() {
        let px = 3;
        for sy in 0..2 {
            for sx in 0..px {
                let id = SubdomainId::from_grid(sx, sy, px);
                assert_eq!(id.grid(px), (sx, sy));
            }
        }
    }

    #[test]
    fn test_ordering() {
        assert!(CellUid::new(1) < CellUid::new(2));
        assert!(SubdomainId::new(0) < SubdomainId::new(3));
    }
}
