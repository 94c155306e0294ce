// crates/gs_io/src/format.rs

//! 文本数据格式
//!
//! 所有文件都是空白分隔的纯文本，每行一条记录。
//!
//! # 拆分目录
//!
//! ```text
//! <root>/domain.info        lx ly Nx Ny Px Py L
//! <root>/quantities.dat     每行一个字段名
//! <root>/sdd<k>/sdd.dat     BL_X BL_Y / SDD_Nx SDD_Ny / uid li lj ...
//! <root>/sdd<k>/<f>.dat     li lj value
//! <root>/sdd<k>/bc.dat      uid x y TAG n [name value]*
//! ```
//!
//! # 全局数据集
//!
//! ```text
//! domain.dat                2D cartesian lx ly Nx Ny / uid i j ...
//! <f>.dat                   uid value
//! quantities.dat            每行一个字段名
//! bc.dat                    uid x y TAG n [name value]*
//! ```
//!
//! 边界类型标签：`D` 给定值、`N` 梯度、`P` 周期（n=0）、`T` 透射。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use gs_config::FloatFormat;
use gs_foundation::prelude::*;
use gs_partition::{
    BcKind, BoundaryRecord, Field, FieldShard, FieldValues, GlobalDomain, SubdomainLayout,
};

use crate::error::{IoError, IoResult};

/// 拆分元数据文件名
pub const DOMAIN_INFO: &str = "domain.info";
/// 子域坐标表文件名
pub const SDD_TABLE: &str = "sdd.dat";
/// 边界文件名
pub const BOUNDARY_FILE: &str = "bc.dat";
/// 字段清单文件名
pub const QUANTITIES_FILE: &str = "quantities.dat";
/// 全局坐标表文件名
pub const GLOBAL_DOMAIN: &str = "domain.dat";

/// 字段文件名 `<name>.dat`
pub fn field_file(name: &str) -> String {
    format!("{}.dat", name)
}

// ============================================================
// 行读写工具
// ============================================================

/// 读取非空行，附带从 1 开始的行号
fn read_lines(path: &Path) -> IoResult<Vec<(usize, String)>> {
    let content = std::fs::read_to_string(path).map_err(IoError::at(path))?;
    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| (n + 1, l.to_string()))
        .collect())
}

fn parse_token<T: FromStr>(path: &Path, line: usize, token: Option<&str>, what: &str) -> IoResult<T> {
    let token = token.ok_or_else(|| IoError::parse(path, line, format!("缺少 {}", what)))?;
    token
        .parse()
        .map_err(|_| IoError::parse(path, line, format!("无法解析 {}: '{}'", what, token)))
}

fn expect_len(path: &Path, line: usize, tokens: &[&str], expected: usize) -> IoResult<()> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(IoError::parse(
            path,
            line,
            format!("期望 {} 列, 实际 {} 列", expected, tokens.len()),
        ))
    }
}

fn create(path: &Path) -> IoResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path).map_err(IoError::at(path))?))
}

fn finish(mut writer: BufWriter<File>, path: &Path) -> IoResult<()> {
    writer.flush().map_err(IoError::at(path))
}

macro_rules! write_line {
    ($w:expr, $path:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(IoError::at($path))?
    };
}

// ============================================================
// domain.info
// ============================================================

/// 写出拆分元数据
pub fn write_domain_info(path: &Path, domain: &GlobalDomain) -> IoResult<()> {
    let mut w = create(path)?;
    write_line!(
        w,
        path,
        "{} {} {} {} {} {} {}",
        domain.lx,
        domain.ly,
        domain.nx,
        domain.ny,
        domain.px,
        domain.py,
        domain.ghost_layers
    );
    finish(w, path)
}

/// 读取拆分元数据
pub fn read_domain_info(path: &Path) -> IoResult<GlobalDomain> {
    let lines = read_lines(path)?;
    let (n, line) = lines
        .first()
        .ok_or_else(|| IoError::parse(path, 1, "文件为空"))?;
    let t: Vec<&str> = line.split_whitespace().collect();
    expect_len(path, *n, &t, 7)?;
    Ok(GlobalDomain {
        lx: parse_token(path, *n, t.first().copied(), "lx")?,
        ly: parse_token(path, *n, t.get(1).copied(), "ly")?,
        nx: parse_token(path, *n, t.get(2).copied(), "Nx")?,
        ny: parse_token(path, *n, t.get(3).copied(), "Ny")?,
        px: parse_token(path, *n, t.get(4).copied(), "Px")?,
        py: parse_token(path, *n, t.get(5).copied(), "Py")?,
        ghost_layers: parse_token(path, *n, t.get(6).copied(), "L")?,
    })
}

// ============================================================
// sdd.dat
// ============================================================

/// 写出子域坐标表
pub fn write_sdd_table(path: &Path, layout: &SubdomainLayout) -> IoResult<()> {
    let mut w = create(path)?;
    let (ox, oy) = layout.origin();
    let (sx, sy) = layout.size();
    write_line!(w, path, "{} {}", ox, oy);
    write_line!(w, path, "{} {}", sx, sy);
    for (uid, li, lj) in layout.cells() {
        write_line!(w, path, "{} {} {}", uid, li, lj);
    }
    finish(w, path)
}

/// 读取子域坐标表
///
/// 局部坐标超出声明尺寸或表不完整时返回 `ShapeMismatch`。
pub fn read_sdd_table(path: &Path, sdd: SubdomainId) -> IoResult<SubdomainLayout> {
    let lines = read_lines(path)?;
    if lines.len() < 2 {
        return Err(IoError::parse(path, lines.len() + 1, "缺少原点或尺寸行"));
    }

    let header = |k: usize, what: &str| -> IoResult<(usize, usize)> {
        let (n, line) = &lines[k];
        let t: Vec<&str> = line.split_whitespace().collect();
        expect_len(path, *n, &t, 2)?;
        Ok((
            parse_token(path, *n, t.first().copied(), what)?,
            parse_token(path, *n, t.get(1).copied(), what)?,
        ))
    };
    let origin = header(0, "原点")?;
    let size = header(1, "尺寸")?;

    let mut layout = SubdomainLayout::new(sdd, origin, size);
    for (n, line) in &lines[2..] {
        let t: Vec<&str> = line.split_whitespace().collect();
        expect_len(path, *n, &t, 3)?;
        let uid: usize = parse_token(path, *n, t.first().copied(), "uid")?;
        let li: i64 = parse_token(path, *n, t.get(1).copied(), "局部 i")?;
        let lj: i64 = parse_token(path, *n, t.get(2).copied(), "局部 j")?;
        layout.insert(CellUid::new(uid), li, lj)?;
    }

    if !layout.is_complete() {
        return Err(GsError::shape_mismatch(
            sdd,
            "sdd",
            format!(
                "坐标表只登记了 {} 个单元, 尺寸 {}x{}",
                layout.cell_count(),
                size.0,
                size.1
            ),
        )
        .into());
    }
    Ok(layout)
}

// ============================================================
// 字段分片
// ============================================================

/// 写出字段分片
pub fn write_shard(path: &Path, shard: &FieldShard, format: FloatFormat) -> IoResult<()> {
    let mut w = create(path)?;
    for entry in shard.entries() {
        write_line!(
            w,
            path,
            "{} {} {}",
            entry.local.0,
            entry.local.1,
            format.format(entry.value)
        );
    }
    finish(w, path)
}

/// 读取字段分片，文件不存在时返回 `None`
pub fn read_shard(
    path: &Path,
    field: &str,
    sdd: SubdomainId,
    size: (usize, usize),
) -> IoResult<Option<FieldShard>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut shard = FieldShard::new(field, sdd, size);
    for (n, line) in read_lines(path)? {
        let t: Vec<&str> = line.split_whitespace().collect();
        expect_len(path, n, &t, 3)?;
        let li: i64 = parse_token(path, n, t.first().copied(), "局部 i")?;
        let lj: i64 = parse_token(path, n, t.get(1).copied(), "局部 j")?;
        let value: f64 = parse_token(path, n, t.get(2).copied(), "值")?;
        shard.push(li, lj, value);
    }
    Ok(Some(shard))
}

// ============================================================
// bc.dat
// ============================================================

/// 写出边界记录
pub fn write_boundary(path: &Path, records: &[BoundaryRecord]) -> IoResult<()> {
    let mut w = create(path)?;
    for record in records {
        let mut line = format!(
            "{} {} {} {}",
            record.uid,
            record.coord.0,
            record.coord.1,
            record.kind.tag()
        );
        match record.kind.payload() {
            Some(payload) => {
                line.push_str(&format!(" {}", payload.len()));
                for (name, value) in payload.iter() {
                    line.push_str(&format!(" {} {}", name, value));
                }
            }
            None => line.push_str(" 0"),
        }
        write_line!(w, path, "{}", line);
    }
    finish(w, path)
}

/// 读取边界记录
pub fn read_boundary(path: &Path) -> IoResult<Vec<BoundaryRecord>> {
    let mut records = Vec::new();
    for (n, line) in read_lines(path)? {
        let t: Vec<&str> = line.split_whitespace().collect();
        if t.len() < 5 {
            return Err(IoError::parse(path, n, "边界记录至少需要 5 列"));
        }
        let uid: usize = parse_token(path, n, t.first().copied(), "uid")?;
        let x: i64 = parse_token(path, n, t.get(1).copied(), "x")?;
        let y: i64 = parse_token(path, n, t.get(2).copied(), "y")?;
        let tag: char = parse_token(path, n, t.get(3).copied(), "边界类型")?;
        let count: usize = parse_token(path, n, t.get(4).copied(), "载荷数")?;
        expect_len(path, n, &t, 5 + 2 * count)?;

        let mut payload = FieldValues::new();
        for pair in t[5..].chunks(2) {
            let value: f64 = parse_token(path, n, pair.get(1).copied(), pair[0])?;
            payload.insert(pair[0], value);
        }
        let kind = BcKind::from_tag(tag, payload)
            .map_err(|e| IoError::parse(path, n, e.to_string()))?;
        records.push(BoundaryRecord::new(CellUid::new(uid), (x, y), kind));
    }
    Ok(records)
}

// ============================================================
// quantities.dat
// ============================================================

/// 写出字段清单
pub fn write_quantities<'a>(path: &Path, names: impl IntoIterator<Item = &'a str>) -> IoResult<()> {
    let mut w = create(path)?;
    for name in names {
        write_line!(w, path, "{}", name);
    }
    finish(w, path)
}

/// 读取字段清单
pub fn read_quantities(path: &Path) -> IoResult<Vec<String>> {
    let mut names = Vec::new();
    for (n, line) in read_lines(path)? {
        let t: Vec<&str> = line.split_whitespace().collect();
        expect_len(path, n, &t, 1)?;
        names.push(t[0].to_string());
    }
    Ok(names)
}

// ============================================================
// 全局数据集
// ============================================================

/// 全局坐标表内容
#[derive(Debug, Clone)]
pub struct GlobalGrid {
    /// x 方向物理长度
    pub lx: f64,
    /// y 方向物理长度
    pub ly: f64,
    /// x 方向单元数
    pub nx: usize,
    /// y 方向单元数
    pub ny: usize,
    /// `(uid, i, j)`
    pub cells: Vec<(CellUid, i64, i64)>,
}

/// 写出全局坐标表，按 uid 递增
pub fn write_global_domain(path: &Path, domain: &GlobalDomain) -> IoResult<()> {
    let mut w = create(path)?;
    write_line!(
        w,
        path,
        "2D cartesian {} {} {} {}",
        domain.lx,
        domain.ly,
        domain.nx,
        domain.ny
    );
    for j in 0..domain.ny {
        for i in 0..domain.nx {
            write_line!(w, path, "{} {} {}", i + j * domain.nx, i, j);
        }
    }
    finish(w, path)
}

/// 读取全局坐标表，检查 `uid = i + j·Nx`
pub fn read_global_domain(path: &Path) -> IoResult<GlobalGrid> {
    let lines = read_lines(path)?;
    let (n, header) = lines
        .first()
        .ok_or_else(|| IoError::parse(path, 1, "文件为空"))?;
    let t: Vec<&str> = header.split_whitespace().collect();
    expect_len(path, *n, &t, 6)?;
    if t[0] != "2D" || t[1] != "cartesian" {
        return Err(IoError::parse(path, *n, "首行应以 '2D cartesian' 开头"));
    }
    let lx: f64 = parse_token(path, *n, t.get(2).copied(), "lx")?;
    let ly: f64 = parse_token(path, *n, t.get(3).copied(), "ly")?;
    let nx: usize = parse_token(path, *n, t.get(4).copied(), "Nx")?;
    let ny: usize = parse_token(path, *n, t.get(5).copied(), "Ny")?;

    let mut cells = Vec::with_capacity(nx * ny);
    for (n, line) in &lines[1..] {
        let t: Vec<&str> = line.split_whitespace().collect();
        expect_len(path, *n, &t, 3)?;
        let uid: usize = parse_token(path, *n, t.first().copied(), "uid")?;
        let i: i64 = parse_token(path, *n, t.get(1).copied(), "i")?;
        let j: i64 = parse_token(path, *n, t.get(2).copied(), "j")?;
        if i < 0 || j < 0 || uid as i64 != i + j * nx as i64 {
            return Err(IoError::parse(
                path,
                *n,
                format!("uid {} 与坐标 ({}, {}) 不一致", uid, i, j),
            ));
        }
        cells.push((CellUid::new(uid), i, j));
    }
    Ok(GlobalGrid {
        lx,
        ly,
        nx,
        ny,
        cells,
    })
}

/// 写出全局字段 `uid value`
pub fn write_global_field(path: &Path, field: &Field, format: FloatFormat) -> IoResult<()> {
    let mut w = create(path)?;
    for (uid, value) in field.iter() {
        write_line!(w, path, "{} {}", uid, format.format(value));
    }
    finish(w, path)
}

/// 读取全局字段，文件不存在时返回 `None`，未列出的 uid 取零
pub fn read_global_field(path: &Path, name: &str, cell_count: usize) -> IoResult<Option<Field>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut entries = Vec::new();
    for (n, line) in read_lines(path)? {
        let t: Vec<&str> = line.split_whitespace().collect();
        expect_len(path, n, &t, 2)?;
        let uid: usize = parse_token(path, n, t.first().copied(), "uid")?;
        let value: f64 = parse_token(path, n, t.get(1).copied(), "值")?;
        entries.push((CellUid::new(uid), value));
    }
    Ok(Some(Field::from_sparse(name, cell_count, entries)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_partition::GridPartitioner;

    #[test]
    fn test_domain_info_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DOMAIN_INFO);
        let domain = GlobalDomain::new(1.5, 0.25, 8, 4)
            .with_partition(2, 2)
            .with_ghost_layers(1);
        write_domain_info(&path, &domain).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.5 0.25 8 4 2 2 1\n");
        assert_eq!(read_domain_info(&path).unwrap(), domain);
    }

    #[test]
    fn test_sdd_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SDD_TABLE);
        let domain = GlobalDomain::new(1.0, 1.0, 4, 4).with_partition(2, 2);
        let table = GridPartitioner::new(&domain).unwrap().partition().unwrap();
        let layout = table.layout(SubdomainId::new(1)).unwrap();

        write_sdd_table(&path, layout).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("2 0\n2 2\n2 0 0\n3 1 0\n6 0 1\n7 1 1\n"));
        assert_eq!(&read_sdd_table(&path, SubdomainId::new(1)).unwrap(), layout);
    }

    #[test]
    fn test_sdd_table_rejects_out_of_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SDD_TABLE);
        std::fs::write(&path, "0 0\n1 1\n0 1 0\n").unwrap();
        let err: GsError = read_sdd_table(&path, SubdomainId::new(0)).unwrap_err().into();
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_sdd_table_incomplete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SDD_TABLE);
        std::fs::write(&path, "0 0\n2 1\n0 0 0\n").unwrap();
        assert!(read_sdd_table(&path, SubdomainId::new(0)).is_err());
    }

    #[test]
    fn test_missing_shard_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(field_file("rho"));
        let shard = read_shard(&path, "rho", SubdomainId::new(0), (2, 2)).unwrap();
        assert!(shard.is_none());
    }

    #[test]
    fn test_boundary_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOUNDARY_FILE);
        let records = vec![
            BoundaryRecord::new(
                CellUid::new(16),
                (-1, -1),
                BcKind::Neumann {
                    coefficients: FieldValues::new().with("rhou_x", -1.0).with("rho", 1.0),
                },
            ),
            BoundaryRecord::new(CellUid::new(17), (-1, 0), BcKind::Periodic),
            BoundaryRecord::new(
                CellUid::new(18),
                (-1, 1),
                BcKind::Dirichlet {
                    values: FieldValues::new().with("rho", 0.125),
                },
            ),
        ];
        write_boundary(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "16 -1 -1 N 2 rho 1 rhou_x -1\n17 -1 0 P 0\n18 -1 1 D 1 rho 0.125\n"
        );
        assert_eq!(read_boundary(&path).unwrap(), records);
    }

    #[test]
    fn test_boundary_bad_payload_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOUNDARY_FILE);
        std::fs::write(&path, "16 -1 -1 T 2 rho 1\n").unwrap();
        let err = read_boundary(&path).unwrap_err();
        assert!(matches!(err, IoError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_global_domain_checks_uid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GLOBAL_DOMAIN);
        std::fs::write(&path, "2D cartesian 1 1 2 1\n0 0 0\n2 1 0\n").unwrap();
        assert!(read_global_domain(&path).is_err());

        write_global_domain(&path, &GlobalDomain::new(1.0, 1.0, 2, 1)).unwrap();
        let grid = read_global_domain(&path).unwrap();
        assert_eq!(grid.cells.len(), 2);
        assert_eq!(grid.cells[1], (CellUid::new(1), 1, 0));
    }

    #[test]
    fn test_global_field_sparse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(field_file("rho"));
        std::fs::write(&path, "2 0.5\n").unwrap();
        let field = read_global_field(&path, "rho", 3).unwrap().unwrap();
        assert_eq!(field.values(), &[0.0, 0.0, 0.5]);
        assert!(read_global_field(&dir.path().join("none.dat"), "none", 3)
            .unwrap()
            .is_none());
    }
}
