// crates/gs_io/src/assembler.rs

//! 数据集拆分与合并
//!
//! `DatasetAssembler` 是唯一了解磁盘布局的组件，负责编排划分、边界路由、
//! 场分片编解码并管理输出目录。
//!
//! # 状态
//!
//! ```text
//! 未拆分 ──split()──> 已拆分（各子域数据集在磁盘上）
//!        ──(外部计算原地覆盖子域字段文件)──> merge() ──> 已合并（全局数据集）
//! ```
//!
//! # 原子性与幂等
//!
//! 所有计算在写盘前完成，配置错误不会产生任何文件。拆分与合并的输出都
//! 先写入同级的临时目录，全部完成后整体替换目标目录，因此目标目录存在即
//! 意味着数据集完整，重复合并也不会残留上一次的字段文件。目标目录中已
//! 存在与请求 `(Nx, Ny, Px, Py)` 一致的完整数据集时直接复用，不重新计算。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gs_config::{FloatFormat, PartitionConfig};
use gs_foundation::prelude::*;
use gs_partition::{
    BoundaryConditionRouter, BoundaryRecord, CaseDefinition, CoordinateSpace, FieldSet,
    FieldShardCodec, GlobalDomain, GridPartitioner, PartitionTable, ShardSet, SubdomainLayout,
};
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::dataset::GlobalDataset;
use crate::error::IoError;
use crate::format::{
    field_file, read_boundary, read_domain_info, read_quantities, read_sdd_table, read_shard,
    write_boundary, write_domain_info, write_quantities, write_sdd_table, write_shard,
    BOUNDARY_FILE, DOMAIN_INFO, QUANTITIES_FILE, SDD_TABLE,
};

// ============================================================
// 子域数据集集合
// ============================================================

/// 磁盘上的一组子域数据集
#[derive(Debug, Clone)]
pub struct SubdomainDatasetSet {
    root: PathBuf,
    domain: GlobalDomain,
    fields: Vec<String>,
    reused: bool,
}

impl SubdomainDatasetSet {
    /// 打开已拆分的目录
    pub fn open(root: &Path) -> GsResult<Self> {
        let domain = read_domain_info(&root.join(DOMAIN_INFO))?;
        domain.validate()?;
        let fields = read_quantities(&root.join(QUANTITIES_FILE))?;
        Ok(Self {
            root: root.to_path_buf(),
            domain,
            fields,
            reused: false,
        })
    }

    /// 根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 拆分时的全局域
    pub fn domain(&self) -> &GlobalDomain {
        &self.domain
    }

    /// 已声明字段
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// 子域数
    pub fn subdomain_count(&self) -> usize {
        self.domain.subdomain_count()
    }

    /// 子域目录 `<root>/sdd<k>`
    pub fn sdd_dir(&self, sdd: SubdomainId) -> PathBuf {
        self.root.join(sdd.dir_name())
    }

    /// 是否复用了已有数据集
    pub fn was_reused(&self) -> bool {
        self.reused
    }
}

// ============================================================
// 编排器
// ============================================================

/// 数据集拆分/合并编排器
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    config: PartitionConfig,
    codec: FieldShardCodec,
}

impl DatasetAssembler {
    /// 创建编排器
    pub fn new(config: PartitionConfig) -> GsResult<Self> {
        config.validate()?;
        let codec = FieldShardCodec::new(config.parallel, config.auto_threshold);
        Ok(Self { config, codec })
    }

    /// 当前配置
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    fn float_format(&self) -> FloatFormat {
        self.config.float_format
    }

    /// 目标目录是否已有与 `(Nx, Ny, Px, Py)` 一致的完整数据集
    pub fn is_partitioned(root: &Path, domain: &GlobalDomain) -> bool {
        let Ok(existing) = read_domain_info(&root.join(DOMAIN_INFO)) else {
            return false;
        };
        let same_shape = (existing.nx, existing.ny, existing.px, existing.py)
            == (domain.nx, domain.ny, domain.px, domain.py);
        same_shape
            && root.join(QUANTITIES_FILE).is_file()
            && (0..domain.subdomain_count())
                .all(|k| root.join(SubdomainId::new(k).dir_name()).join(SDD_TABLE).is_file())
    }

    /// 拆分算例，分区形状取自配置
    pub fn split_case(
        &self,
        case: &dyn CaseDefinition,
        output_root: &Path,
    ) -> GsResult<SubdomainDatasetSet> {
        let domain = case
            .domain()
            .with_partition(self.config.px, self.config.py);
        info!("拆分算例 {}", case.name());
        let fields = case.fields()?;
        let records = case.boundary_records()?;
        self.split(&domain, &fields, &records, output_root)
    }

    /// 拆分全局数据
    pub fn split(
        &self,
        domain: &GlobalDomain,
        fields: &FieldSet,
        records: &[BoundaryRecord],
        output_root: &Path,
    ) -> GsResult<SubdomainDatasetSet> {
        let _span = info_span!("split", root = %output_root.display()).entered();
        domain.validate()?;

        if Self::is_partitioned(output_root, domain) {
            info!(
                "{} 已包含 {}x{} 网格的 {}x{} 分区，跳过拆分",
                output_root.display(),
                domain.nx,
                domain.ny,
                domain.px,
                domain.py
            );
            let mut set = SubdomainDatasetSet::open(output_root)?;
            set.reused = true;
            return Ok(set);
        }

        GsError::check_size("字段单元数", domain.cell_count(), fields.cell_count())?;

        // 全部计算在写盘前完成
        let table = GridPartitioner::new(domain)?.partition()?;
        let routed = BoundaryConditionRouter::new(&table)?
            .with_strategy(self.config.parallel, self.config.auto_threshold)
            .route(records)?;
        let shards = self.codec.split_all(&table, fields)?;

        let staging = stage_dir(output_root)?;
        write_domain_info(&staging.path().join(DOMAIN_INFO), domain)?;
        write_quantities(&staging.path().join(QUANTITIES_FILE), fields.names())?;

        let write = |layout: &SubdomainLayout| -> GsResult<()> {
            self.write_subdomain(staging.path(), layout, &routed[layout.id().get()], &shards)
        };
        if self
            .config
            .parallel
            .should_parallelize(table.cell_count(), self.config.auto_threshold)
        {
            table.layouts().par_iter().try_for_each(write)?;
        } else {
            table.layouts().iter().try_for_each(write)?;
        }

        commit_stage(staging, output_root)?;

        info!(
            "拆分完成: {} 个子域, {} 个字段, {} 条边界记录",
            table.subdomain_count(),
            fields.len(),
            records.len()
        );
        Ok(SubdomainDatasetSet {
            root: output_root.to_path_buf(),
            domain: *domain,
            fields: fields.names().map(str::to_string).collect(),
            reused: false,
        })
    }

    fn write_subdomain(
        &self,
        stage: &Path,
        layout: &SubdomainLayout,
        boundary: &[BoundaryRecord],
        shards: &BTreeMap<String, ShardSet>,
    ) -> GsResult<()> {
        let id = layout.id();
        let dir = stage.join(id.dir_name());
        fs::create_dir_all(&dir).map_err(IoError::at(&dir))?;

        write_sdd_table(&dir.join(SDD_TABLE), layout)?;
        write_boundary(&dir.join(BOUNDARY_FILE), boundary)?;
        let mut written = 0;
        for (name, set) in shards {
            if let Some(shard) = &set[id.get()] {
                write_shard(&dir.join(field_file(name)), shard, self.float_format())?;
                written += 1;
            }
        }
        debug!(
            "子域 {} 已写出: {} 个单元, {} 条边界记录, {} 个字段文件",
            id,
            layout.cell_count(),
            boundary.len(),
            written
        );
        Ok(())
    }

    /// 合并子域数据集为全局数据集
    pub fn merge(&self, set: &SubdomainDatasetSet, output: &Path) -> GsResult<GlobalDataset> {
        let _span = info_span!("merge", root = %set.root().display()).entered();
        let space = CoordinateSpace::new(set.domain())?;

        // 局部 → 全局映射从磁盘坐标表重建
        let layouts = (0..space.subdomain_count())
            .map(|k| {
                let id = SubdomainId::new(k);
                Ok(read_sdd_table(&set.sdd_dir(id).join(SDD_TABLE), id)?)
            })
            .collect::<GsResult<Vec<_>>>()?;
        let table = PartitionTable::from_layouts(space, layouts)?;

        let mut fields = FieldSet::new(table.cell_count());
        for name in set.fields() {
            let shards = self.read_shards(set, &table, name)?;
            if shards.iter().all(Option::is_none) {
                debug!("字段 {} 在所有子域中缺失", name);
                fields.declare_absent(name.clone());
            } else {
                fields.insert(self.codec.merge_field(&table, name, &shards)?)?;
            }
        }

        let boundary = self.merge_boundary(set, &table)?;
        let domain = set.domain().with_partition(1, 1);
        let staging = stage_dir(output)?;
        GlobalDataset::write(staging.path(), &domain, &fields, &boundary, self.float_format())?;
        commit_stage(staging, output)?;

        info!(
            "合并完成: {} 个子域 -> {}",
            table.subdomain_count(),
            output.display()
        );
        Ok(GlobalDataset {
            root: output.to_path_buf(),
            domain,
            fields,
            boundary,
        })
    }

    fn read_shards(
        &self,
        set: &SubdomainDatasetSet,
        table: &PartitionTable,
        name: &str,
    ) -> GsResult<ShardSet> {
        table
            .layouts()
            .iter()
            .map(|layout| {
                let path = set.sdd_dir(layout.id()).join(field_file(name));
                Ok(read_shard(&path, name, layout.id(), layout.size())?)
            })
            .collect()
    }

    /// 各子域边界记录还原到全局坐标，角点副本按 uid 去重
    ///
    /// 拆分总会写出 `bc.dat`（可能为空），缺失即数据集不完整。
    fn merge_boundary(
        &self,
        set: &SubdomainDatasetSet,
        table: &PartitionTable,
    ) -> GsResult<Vec<BoundaryRecord>> {
        let mut merged: BTreeMap<CellUid, BoundaryRecord> = BTreeMap::new();
        for layout in table.layouts() {
            let path = set.sdd_dir(layout.id()).join(BOUNDARY_FILE);
            if !path.is_file() {
                return Err(IoError::IncompleteDataset {
                    root: set.root().display().to_string(),
                    reason: format!("{}/{} 缺失", layout.id().dir_name(), BOUNDARY_FILE),
                }
                .into());
            }
            for record in read_boundary(&path)? {
                let global = record.to_global_frame(layout.origin());
                if let Some(prev) = merged.get(&global.uid) {
                    ensure!(
                        prev == &global,
                        GsError::invalid_input(format!(
                            "边界单元 {} 在子域 {} 中的坐标 {:?} 与先前的 {:?} 不一致",
                            global.uid,
                            layout.id(),
                            global.coord,
                            prev.coord
                        ))
                    );
                    continue;
                }
                merged.insert(global.uid, global);
            }
        }
        Ok(merged.into_values().collect())
    }
}

/// 暂存目录整体替换目标目录
fn commit_stage(staging: tempfile::TempDir, target: &Path) -> GsResult<()> {
    let staged = staging.keep();
    if target.exists() {
        warn!("替换已有目录 {}", target.display());
        if let Err(e) = fs::remove_dir_all(target) {
            let _ = fs::remove_dir_all(&staged);
            return Err(IoError::at(target)(e).into());
        }
    }
    if let Err(e) = fs::rename(&staged, target) {
        let _ = fs::remove_dir_all(&staged);
        return Err(IoError::at(target)(e).into());
    }
    Ok(())
}

/// 在目标目录旁创建暂存目录
fn stage_dir(output_root: &Path) -> GsResult<tempfile::TempDir> {
    require!(
        output_root.file_name(),
        GsError::invalid_input(format!("输出路径 {} 必须指向具名目录", output_root.display()))
    );
    let parent = output_root
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(IoError::at(parent))?;
    let staging = tempfile::Builder::new()
        .prefix(".gs_stage_")
        .tempdir_in(parent)
        .map_err(IoError::at(parent))?;
    Ok(staging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_partition::Sod2D;

    #[test]
    fn test_is_partitioned_requires_matching_shape() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("2x2");
        let assembler = DatasetAssembler::new(PartitionConfig::with_shape(2, 2)).unwrap();
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 4, 4));
        assembler.split_case(&case, &root).unwrap();

        let domain = GlobalDomain::new(1.0, 1.0, 4, 4).with_partition(2, 2);
        assert!(DatasetAssembler::is_partitioned(&root, &domain));
        assert!(!DatasetAssembler::is_partitioned(&root, &domain.with_partition(4, 1)));

        fs::remove_file(root.join("sdd3").join(SDD_TABLE)).unwrap();
        assert!(!DatasetAssembler::is_partitioned(&root, &domain));
    }

    #[test]
    fn test_no_staging_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("1x2");
        let assembler = DatasetAssembler::new(PartitionConfig::with_shape(1, 2)).unwrap();
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 2, 4));
        assembler.split_case(&case, &root).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("1x2")]);
    }

    #[test]
    fn test_missing_boundary_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("2x2");
        let assembler = DatasetAssembler::new(PartitionConfig::with_shape(2, 2)).unwrap();
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 4, 4));
        let set = assembler.split_case(&case, &root).unwrap();

        fs::remove_file(root.join("sdd2").join(BOUNDARY_FILE)).unwrap();
        let out = dir.path().join("merged");
        let err = assembler.merge(&set, &out).unwrap_err();
        assert!(err.is_io());
        assert!(!out.exists());
    }

    #[test]
    fn test_unnamed_output_rejected() {
        let assembler = DatasetAssembler::new(PartitionConfig::with_shape(1, 1)).unwrap();
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 2, 2));
        assert!(assembler.split_case(&case, Path::new("/")).is_err());
    }

    #[test]
    fn test_stale_directory_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("2x1");
        fs::create_dir_all(root.join("sdd0")).unwrap();
        fs::write(root.join("junk.txt"), "stale").unwrap();

        let assembler = DatasetAssembler::new(PartitionConfig::with_shape(2, 1)).unwrap();
        let case = Sod2D::new(GlobalDomain::new(1.0, 1.0, 4, 2));
        let set = assembler.split_case(&case, &root).unwrap();
        assert!(!set.was_reused());
        assert!(!root.join("junk.txt").exists());
        assert!(root.join("sdd1").join(SDD_TABLE).is_file());
    }
}
