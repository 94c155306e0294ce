// crates/gs_partition/src/field.rs

//! 标量场
//!
//! `Field` 是定义在全部内部单元上的稠密数组，按 uid 索引。
//! `FieldSet` 记录每个已声明字段是否存在：缺失的字段用 `None`
//! 表示，语义上恒为零，不是错误。

use gs_foundation::prelude::*;
use std::collections::BTreeMap;

/// 命名标量场
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    values: Vec<f64>,
}

impl Field {
    /// 全零场
    pub fn zeros(name: impl Into<String>, cell_count: usize) -> Self {
        Self {
            name: name.into(),
            values: vec![0.0; cell_count],
        }
    }

    /// 由稠密数组构造
    pub fn from_values(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// 按 uid 逐个求值
    pub fn from_fn<F>(name: impl Into<String>, cell_count: usize, f: F) -> Self
    where
        F: Fn(CellUid) -> f64,
    {
        Self {
            name: name.into(),
            values: (0..cell_count).map(|u| f(CellUid::new(u))).collect(),
        }
    }

    /// 由稀疏条目构造，未给出的 uid 取零
    pub fn from_sparse<I>(name: impl Into<String>, cell_count: usize, entries: I) -> GsResult<Self>
    where
        I: IntoIterator<Item = (CellUid, f64)>,
    {
        let mut field = Self::zeros(name, cell_count);
        for (uid, value) in entries {
            field.set(uid, value)?;
        }
        Ok(field)
    }

    /// 字段名
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 读取单元值
    #[inline]
    pub fn get(&self, uid: CellUid) -> Option<f64> {
        self.values.get(uid.get()).copied()
    }

    /// 写入单元值
    pub fn set(&mut self, uid: CellUid, value: f64) -> GsResult<()> {
        GsError::check_index("Cell", uid.get(), self.values.len())?;
        self.values[uid.get()] = value;
        Ok(())
    }

    /// 稠密数组
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 按 uid 遍历
    pub fn iter(&self) -> impl Iterator<Item = (CellUid, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(u, v)| (CellUid::new(u), *v))
    }
}

// ============================================================
// 字段集合
// ============================================================

/// 已声明字段的集合，字段可缺失（恒为零）
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    cell_count: usize,
    fields: BTreeMap<String, Option<Field>>,
}

impl FieldSet {
    /// 创建空集合
    pub fn new(cell_count: usize) -> Self {
        Self {
            cell_count,
            fields: BTreeMap::new(),
        }
    }

    /// 单元数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// 插入字段，长度必须与单元数一致
    pub fn insert(&mut self, field: Field) -> GsResult<()> {
        GsError::check_size(field.name(), self.cell_count, field.len())?;
        self.fields.insert(field.name.clone(), Some(field));
        Ok(())
    }

    /// 声明一个缺失（恒为零）的字段
    pub fn declare_absent(&mut self, name: impl Into<String>) {
        self.fields.insert(name.into(), None);
    }

    /// 是否声明了该字段
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// 字段数据，缺失或未声明时为 `None`
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    /// 已声明但缺失
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(None))
    }

    /// 单元值，缺失字段返回零
    pub fn value(&self, name: &str, uid: CellUid) -> f64 {
        self.field(name).and_then(|f| f.get(uid)).unwrap_or(0.0)
    }

    /// 字段名，按名称有序
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// 遍历 `(名称, 字段)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Field>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// 字段数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sparse_fills_zero() {
        let field =
            Field::from_sparse("rho", 4, [(CellUid::new(1), 2.0), (CellUid::new(3), 0.5)]).unwrap();
        assert_eq!(field.values(), &[0.0, 2.0, 0.0, 0.5]);
    }

    #[test]
    fn test_from_sparse_rejects_unknown_uid() {
        assert!(Field::from_sparse("rho", 4, [(CellUid::new(4), 1.0)]).is_err());
    }

    #[test]
    fn test_field_set_absent_is_zero() {
        let mut set = FieldSet::new(3);
        set.insert(Field::from_values("rho", vec![1.0, 2.0, 3.0])).unwrap();
        set.declare_absent("rhou_x");

        assert!(set.is_absent("rhou_x"));
        assert!(!set.is_absent("rho"));
        assert_eq!(set.value("rhou_x", CellUid::new(2)), 0.0);
        assert_eq!(set.value("missing", CellUid::new(0)), 0.0);
        assert!(!set.is_absent("missing"));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["rho", "rhou_x"]);
    }

    #[test]
    fn test_field_set_size_check() {
        let mut set = FieldSet::new(3);
        let err = set.insert(Field::zeros("rho", 2)).unwrap_err();
        assert!(err.is_shape_mismatch());
    }
}
