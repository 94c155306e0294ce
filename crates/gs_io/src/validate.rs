// crates/gs_io/src/validate.rs

//! 已拆分目录的完整性检查
//!
//! 不修改磁盘，只收集问题。缺失的字段文件是警告（合并时按全零处理），
//! 其余问题是错误。拆分总会写出 `bc.dat`，缺失时合并会失败。

use std::collections::BTreeMap;
use std::path::Path;

use gs_foundation::prelude::*;
use gs_partition::{CoordinateSpace, SubdomainLayout};
use tracing::{debug, info};

use crate::format::{
    field_file, read_boundary, read_domain_info, read_quantities, read_sdd_table, read_shard,
    BOUNDARY_FILE, DOMAIN_INFO, QUANTITIES_FILE, SDD_TABLE,
};

/// 检查拆分目录
///
/// `domain.info` 缺失时报告中只有这一条错误；其无法解析时返回 `Err`。
pub fn validate_split(root: &Path) -> GsResult<ValidationReport> {
    let mut report = ValidationReport::new();

    let info_path = root.join(DOMAIN_INFO);
    if !info_path.is_file() {
        report.add_error(ValidationError::MissingFile { path: info_path });
        return Ok(report);
    }
    let domain = read_domain_info(&info_path)?;
    let space = CoordinateSpace::new(&domain)?;

    let quantities = root.join(QUANTITIES_FILE);
    let fields = if quantities.is_file() {
        read_quantities(&quantities)?
    } else {
        report.add_error(ValidationError::MissingFile { path: quantities });
        Vec::new()
    };

    let mut owners: Vec<Option<SubdomainId>> = vec![None; space.cell_count()];
    let mut missing: BTreeMap<&str, Vec<SubdomainId>> = BTreeMap::new();
    let mut readable = 0;
    for k in 0..space.subdomain_count() {
        let sdd = SubdomainId::new(k);
        let dir = root.join(sdd.dir_name());

        let table_path = dir.join(SDD_TABLE);
        if !table_path.is_file() {
            report.add_error(ValidationError::MissingFile { path: table_path });
            continue;
        }
        let layout = match read_sdd_table(&table_path, sdd) {
            Ok(layout) => layout,
            Err(e) => {
                report.add_error(ValidationError::ConsistencyError {
                    message: format!("{}: {}", table_path.display(), e),
                });
                continue;
            }
        };

        readable += 1;
        check_layout(&space, &layout, &mut owners, &mut report);
        for name in check_shards(&dir, &layout, &fields, &mut report) {
            missing.entry(name).or_default().push(sdd);
        }
        check_boundary(&dir, &space, &layout, &mut report);
    }

    // 所有可读子域都缺失的字段视为整体缺失
    for (field, sdds) in missing {
        if sdds.len() == readable {
            debug!("字段{} 在所有子域中缺失", field);
            continue;
        }
        for sdd in sdds {
            report.add_warning(ValidationWarning::MissingField {
                sdd,
                field: field.to_string(),
            });
        }
    }

    for (uid, owner) in owners.iter().enumerate() {
        if owner.is_none() {
            report.add_error(ValidationError::UncoveredCell {
                uid: CellUid::new(uid),
            });
        }
    }

    info!(
        "{} 检查完成: {} 个错误, {} 个警告",
        root.display(),
        report.error_count(),
        report.warning_count()
    );
    Ok(report)
}

/// 坐标表与划分规则一致，且单元归属不重叠
fn check_layout(
    space: &CoordinateSpace,
    layout: &SubdomainLayout,
    owners: &mut [Option<SubdomainId>],
    report: &mut ValidationReport,
) {
    let sdd = layout.id();
    if layout.origin() != space.origin(sdd) || layout.size() != space.subdomain_size() {
        report.add_error(ValidationError::ConsistencyError {
            message: format!(
                "子域{} 原点 {:?} 尺寸 {:?}, 应为 {:?} {:?}",
                sdd,
                layout.origin(),
                layout.size(),
                space.origin(sdd),
                space.subdomain_size()
            ),
        });
    }

    for (uid, li, lj) in layout.cells() {
        let Some(slot) = owners.get_mut(uid.get()) else {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("子域{}: 单元{} 超出网格", sdd, uid),
            });
            continue;
        };
        if let Some(first) = *slot {
            report.add_error(ValidationError::DuplicateCell {
                uid,
                first,
                second: sdd,
            });
            continue;
        }
        *slot = Some(sdd);

        let (i, j) = layout.to_global(li, lj);
        if i >= space.grid_size().0 || j >= space.grid_size().1 || space.uid(i, j) != uid {
            report.add_error(ValidationError::ConsistencyError {
                message: format!("子域{}: 单元{} 位于全局坐标 ({}, {})", sdd, uid, i, j),
            });
        }
    }
}

/// 返回缺少分片文件的字段
fn check_shards<'f>(
    dir: &Path,
    layout: &SubdomainLayout,
    fields: &'f [String],
    report: &mut ValidationReport,
) -> Vec<&'f str> {
    let mut missing = Vec::new();
    for name in fields {
        let path = dir.join(field_file(name));
        let shard = match read_shard(&path, name, layout.id(), layout.size()) {
            Ok(shard) => shard,
            Err(e) => {
                report.add_error(ValidationError::ConsistencyError {
                    message: e.to_string(),
                });
                continue;
            }
        };
        let Some(shard) = shard else {
            missing.push(name.as_str());
            continue;
        };
        for entry in shard.entries() {
            if !layout.contains_local(entry.local.0, entry.local.1) {
                report.add_error(ValidationError::ShardOutOfShape {
                    sdd: layout.id(),
                    field: name.clone(),
                    local: entry.local,
                    size: layout.size(),
                });
            }
        }
        debug!("子域{} 字段{}: {} 条", layout.id(), name, shard.len());
    }
    missing
}

/// 边界记录还原到全局后必须落在 ghost 环上
fn check_boundary(
    dir: &Path,
    space: &CoordinateSpace,
    layout: &SubdomainLayout,
    report: &mut ValidationReport,
) {
    let path = dir.join(BOUNDARY_FILE);
    if !path.is_file() {
        report.add_error(ValidationError::MissingFile { path });
        return;
    }
    let records = match read_boundary(&path) {
        Ok(records) => records,
        Err(e) => {
            report.add_error(ValidationError::ConsistencyError {
                message: e.to_string(),
            });
            return;
        }
    };
    for record in records {
        let (x, y) = record.to_global_frame(layout.origin()).coord;
        let on_ring = space.within_ghost_range(x, y) && !space.contains(x, y);
        let uid_matches = on_ring && space.ghost_uid(x, y).ok() == Some(record.uid);
        if !uid_matches {
            report.add_error(ValidationError::ConsistencyError {
                message: format!(
                    "子域{}: 边界记录 {} 的全局坐标 ({}, {}) 不在对应的 ghost 位置",
                    layout.id(),
                    record.uid,
                    x,
                    y
                ),
            });
        }
    }
}
