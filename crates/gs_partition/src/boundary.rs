// crates/gs_partition/src/boundary.rs

//! 边界条件类型
//!
//! 边界记录把 ghost 环上的坐标与 uid、边界条件载荷关联起来。
//! 载荷按字段名给出系数或取值，例如反射壁面的 Neumann 系数：
//!
//! ```
//! use gs_partition::boundary::{BcKind, FieldValues};
//!
//! let wall = BcKind::Neumann {
//!     coefficients: FieldValues::new().with("rho", 1.0).with("rhou_x", -1.0),
//! };
//! assert_eq!(wall.tag(), 'N');
//! assert_eq!(wall.payload().unwrap().get("rhou_x"), Some(-1.0));
//! ```

use gs_foundation::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coords::CoordinateSpace;

// ============================================================
// 载荷
// ============================================================

/// 按字段名索引的数值表，按名称有序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<String, f64>);

impl FieldValues {
    /// 空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式插入
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// 插入或覆盖
    pub fn insert(&mut self, field: impl Into<String>, value: f64) {
        self.0.insert(field.into(), value);
    }

    /// 查询
    pub fn get(&self, field: &str) -> Option<f64> {
        self.0.get(field).copied()
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按字段名顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================
// 边界类型
// ============================================================

/// 边界条件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BcKind {
    /// 给定值
    Dirichlet {
        /// 各字段的边界值
        values: FieldValues,
    },
    /// 给定梯度，ghost 值 = 系数 × 相邻内部值
    Neumann {
        /// 各字段的镜像系数
        coefficients: FieldValues,
    },
    /// 周期
    Periodic,
    /// 透射（无反射）
    Transparent {
        /// 各字段的远场参考值
        values: FieldValues,
    },
}

impl BcKind {
    /// 单字符类型标签 `D`/`N`/`P`/`T`
    pub fn tag(&self) -> char {
        match self {
            Self::Dirichlet { .. } => 'D',
            Self::Neumann { .. } => 'N',
            Self::Periodic => 'P',
            Self::Transparent { .. } => 'T',
        }
    }

    /// 载荷，周期边界没有载荷
    pub fn payload(&self) -> Option<&FieldValues> {
        match self {
            Self::Dirichlet { values } | Self::Transparent { values } => Some(values),
            Self::Neumann { coefficients } => Some(coefficients),
            Self::Periodic => None,
        }
    }

    /// 由标签与载荷构造
    pub fn from_tag(tag: char, payload: FieldValues) -> GsResult<Self> {
        match tag {
            'D' => Ok(Self::Dirichlet { values: payload }),
            'N' => Ok(Self::Neumann {
                coefficients: payload,
            }),
            'T' => Ok(Self::Transparent { values: payload }),
            'P' => {
                ensure!(
                    payload.is_empty(),
                    GsError::invalid_input("周期边界不应携带载荷")
                );
                Ok(Self::Periodic)
            }
            other => Err(GsError::invalid_input(format!(
                "未知的边界类型标签 '{}'",
                other
            ))),
        }
    }
}

// ============================================================
// 边界记录
// ============================================================

/// 边界记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    /// 单元标识
    pub uid: CellUid,
    /// 坐标，全局或某子域的局部坐标系
    pub coord: (i64, i64),
    /// 边界条件
    pub kind: BcKind,
}

/// 全局边界记录集合
pub type BoundaryRecordSet = Vec<BoundaryRecord>;

impl BoundaryRecord {
    /// 创建记录
    pub fn new(uid: CellUid, coord: (i64, i64), kind: BcKind) -> Self {
        Self { uid, coord, kind }
    }

    /// 平移到原点为 `origin` 的局部坐标系
    pub fn translated(&self, origin: (usize, usize)) -> Self {
        Self {
            uid: self.uid,
            coord: (
                self.coord.0 - origin.0 as i64,
                self.coord.1 - origin.1 as i64,
            ),
            kind: self.kind.clone(),
        }
    }

    /// 从原点为 `origin` 的局部坐标系还原到全局坐标
    pub fn to_global_frame(&self, origin: (usize, usize)) -> Self {
        Self {
            uid: self.uid,
            coord: (
                self.coord.0 + origin.0 as i64,
                self.coord.1 + origin.1 as i64,
            ),
            kind: self.kind.clone(),
        }
    }

    /// 为整个 ghost 环生成记录，uid 取环编号
    pub fn ring<F>(space: &CoordinateSpace, mut kind_at: F) -> GsResult<BoundaryRecordSet>
    where
        F: FnMut(i64, i64) -> BcKind,
    {
        space
            .ghost_coords()?
            .into_iter()
            .map(|(x, y)| -> GsResult<Self> {
                Ok(Self::new(space.ghost_uid(x, y)?, (x, y), kind_at(x, y)))
            })
            .collect()
    }
}
