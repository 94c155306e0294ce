// crates/gs_io/src/dataset.rs

//! 全局数据集
//!
//! 合并的输出，也是拆分的输入。`FileCase` 把磁盘上的全局数据集包装成
//! 算例，供拆分流程直接使用。

use std::path::{Path, PathBuf};

use gs_config::FloatFormat;
use gs_foundation::prelude::*;
use gs_partition::{
    BoundaryRecordSet, CaseDefinition, CoordinateSpace, FieldSet, GlobalDomain, GridPartitioner,
};
use tracing::{debug, info};

use crate::error::IoError;
use crate::format::{
    field_file, read_boundary, read_global_domain, read_global_field, read_quantities,
    write_boundary, write_global_domain, write_global_field, write_quantities, BOUNDARY_FILE,
    GLOBAL_DOMAIN, QUANTITIES_FILE,
};

/// 全局数据集
#[derive(Debug, Clone)]
pub struct GlobalDataset {
    /// 所在目录
    pub root: PathBuf,
    /// 全局域（单子域）
    pub domain: GlobalDomain,
    /// 字段
    pub fields: FieldSet,
    /// 全局边界记录
    pub boundary: BoundaryRecordSet,
}

impl GlobalDataset {
    /// 写出全局数据集
    ///
    /// 缺失字段只登记在 `quantities.dat` 中，同名的旧字段文件会被删除。
    /// 写出格式必须可逐值往返。
    pub fn write(
        root: &Path,
        domain: &GlobalDomain,
        fields: &FieldSet,
        boundary: &BoundaryRecordSet,
        format: FloatFormat,
    ) -> GsResult<()> {
        GsError::check_size("字段单元数", domain.cell_count(), fields.cell_count())?;
        ensure!(
            format.is_lossless(),
            GsError::configuration(format!("写出格式 {:?} 无法逐值往返", format))
        );
        std::fs::create_dir_all(root).map_err(IoError::at(root))?;

        write_global_domain(&root.join(GLOBAL_DOMAIN), domain)?;
        write_quantities(&root.join(QUANTITIES_FILE), fields.names())?;
        for (name, field) in fields.iter() {
            let path = root.join(field_file(name));
            match field {
                Some(field) => write_global_field(&path, field, format)?,
                None if path.exists() => {
                    debug!("删除缺失字段的旧文件 {}", path.display());
                    std::fs::remove_file(&path).map_err(IoError::at(&path))?;
                }
                None => {}
            }
        }
        write_boundary(&root.join(BOUNDARY_FILE), boundary)?;

        info!(
            "全局数据集已写出: {} ({} 个字段, {} 条边界记录)",
            root.display(),
            fields.len(),
            boundary.len()
        );
        Ok(())
    }

    /// 读取全局数据集
    ///
    /// ghost 层数取边界记录的最大环序号；没有 `bc.dat` 时为 0。
    pub fn read(root: &Path) -> GsResult<Self> {
        let grid = read_global_domain(&root.join(GLOBAL_DOMAIN))?;
        let mut domain = GlobalDomain::new(grid.lx, grid.ly, grid.nx, grid.ny).with_ghost_layers(0);

        // 坐标表必须恰好覆盖整个网格
        let coords: Vec<(i64, i64)> = grid.cells.iter().map(|&(_, i, j)| (i, j)).collect();
        GridPartitioner::new(&domain)?.partition_coords(&coords)?;

        let bc_path = root.join(BOUNDARY_FILE);
        let boundary = if bc_path.exists() {
            read_boundary(&bc_path)?
        } else {
            debug!("{} 不存在，无边界记录", bc_path.display());
            Vec::new()
        };
        let space = CoordinateSpace::new(&domain)?;
        domain.ghost_layers = boundary
            .iter()
            .map(|r| space.ring_of(r.coord.0, r.coord.1))
            .max()
            .unwrap_or(0);

        let n = domain.cell_count();
        let mut fields = FieldSet::new(n);
        for name in read_quantities(&root.join(QUANTITIES_FILE))? {
            match read_global_field(&root.join(field_file(&name)), &name, n)? {
                Some(field) => fields.insert(field)?,
                None => fields.declare_absent(name),
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            domain,
            fields,
            boundary,
        })
    }
}

// ============================================================
// 文件算例
// ============================================================

/// 从磁盘全局数据集构造的算例
#[derive(Debug, Clone)]
pub struct FileCase {
    name: String,
    dataset: GlobalDataset,
}

impl FileCase {
    /// 打开目录
    pub fn open(root: &Path) -> GsResult<Self> {
        let dataset = GlobalDataset::read(root)?;
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        Ok(Self { name, dataset })
    }

    /// 底层数据集
    pub fn dataset(&self) -> &GlobalDataset {
        &self.dataset
    }
}

impl CaseDefinition for FileCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> GlobalDomain {
        self.dataset.domain
    }

    fn fields(&self) -> GsResult<FieldSet> {
        Ok(self.dataset.fields.clone())
    }

    fn boundary_records(&self) -> GsResult<BoundaryRecordSet> {
        Ok(self.dataset.boundary.clone())
    }
}
