// crates/gs_io/tests/split_merge.rs

//! 磁盘上的拆分/合并集成测试

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gs_config::{FloatFormat, ParallelStrategy, PartitionConfig};
use gs_foundation::CellUid;
use gs_io::{validate_split, DatasetAssembler, FileCase, GlobalDataset, SubdomainDatasetSet};
use gs_partition::{
    BcKind, BoundaryRecord, CaseDefinition, CoordinateSpace, Field, FieldSet, GlobalDomain,
    PeriodicTransport, Sod2D,
};

fn assembler(px: usize, py: usize) -> DatasetAssembler {
    DatasetAssembler::new(PartitionConfig::with_shape(px, py)).unwrap()
}

/// 递归读取目录下所有文件
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    files
}

/// 4x4 网格, 子域 (0,0) 内 rho=1, 其余 0.125
fn four_by_four() -> (GlobalDomain, FieldSet, Vec<BoundaryRecord>) {
    let domain = GlobalDomain::new(1.0, 1.0, 4, 4).with_partition(2, 2);
    let rho = Field::from_fn("rho", 16, |u| match u.get() {
        0 | 1 | 4 | 5 => 1.0,
        _ => 0.125,
    });
    let mut fields = FieldSet::new(16);
    fields.insert(rho).unwrap();
    let space = CoordinateSpace::new(&domain).unwrap();
    let records = BoundaryRecord::ring(&space, |_, _| BcKind::Periodic).unwrap();
    (domain, fields, records)
}

#[test]
fn test_concrete_scenario_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let (domain, fields, records) = four_by_four();
    let set = assembler(2, 2).split(&domain, &fields, &records, &root).unwrap();
    assert_eq!(set.subdomain_count(), 4);

    let rho = fs::read_to_string(root.join("sdd0").join("rho.dat")).unwrap();
    let lines: Vec<&str> = rho.lines().collect();
    assert_eq!(lines, vec!["0 0 1", "1 0 1", "0 1 1", "1 1 1"]);

    let table = fs::read_to_string(root.join("sdd0").join("sdd.dat")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines, vec!["0 0", "2 2", "0 0 0", "1 1 0", "4 0 1", "5 1 1"]);

    let info = fs::read_to_string(root.join("domain.info")).unwrap();
    assert_eq!(info.trim(), "1 1 4 4 2 2 1");
}

#[test]
fn test_corner_record_in_two_subdomains() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let (domain, fields, records) = four_by_four();
    assembler(2, 2).split(&domain, &fields, &records, &root).unwrap();

    // 角点 (-1,-1) 的 uid 为 16
    let bc0 = fs::read_to_string(root.join("sdd0").join("bc.dat")).unwrap();
    let bc3 = fs::read_to_string(root.join("sdd3").join("bc.dat")).unwrap();
    assert!(bc0.lines().any(|l| l == "16 -1 -1 P 0"));
    assert!(bc3.lines().any(|l| l == "16 -3 -3 P 0"));

    let total: usize = (0..4)
        .map(|k| {
            fs::read_to_string(root.join(format!("sdd{}", k)).join("bc.dat"))
                .unwrap()
                .lines()
                .count()
        })
        .sum();
    assert_eq!(total, records.len() + 4);
}

#[test]
fn test_roundtrip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let case = Sod2D::new(GlobalDomain::new(2.0, 1.0, 12, 8).with_ghost_layers(2));
    let assembler = assembler(3, 2);
    let set = assembler.split_case(&case, &dir.path().join("3x2")).unwrap();

    let out = dir.path().join("merged");
    let merged = assembler.merge(&set, &out).unwrap();
    let fields = case.fields().unwrap();
    for name in ["rho", "rhoE"] {
        assert_eq!(merged.fields.field(name), fields.field(name));
    }
    assert!(merged.fields.is_absent("rhou_x"));
    assert_eq!(merged.boundary, case.boundary_records().unwrap());

    let reread = GlobalDataset::read(&out).unwrap();
    assert_eq!(reread.domain.px, 1);
    assert_eq!(reread.domain.ghost_layers, 2);
    assert_eq!(reread.fields.field("rho"), fields.field("rho"));
    assert_eq!(reread.boundary, merged.boundary);
}

#[test]
fn test_parallel_and_sequential_outputs_identical() {
    let dir = tempfile::tempdir().unwrap();
    let case = PeriodicTransport::new(GlobalDomain::new(1.0, 1.0, 16, 16));

    let mut snapshots = Vec::new();
    for (name, strategy) in [("seq", ParallelStrategy::Sequential), ("par", ParallelStrategy::Parallel)] {
        let config = PartitionConfig {
            parallel: strategy,
            ..PartitionConfig::with_shape(4, 2)
        };
        let root = dir.path().join(name);
        DatasetAssembler::new(config).unwrap().split_case(&case, &root).unwrap();
        snapshots.push(snapshot(&root));
    }
    assert_eq!(snapshots[0], snapshots[1]);
}

#[test]
fn test_idempotent_split() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let (domain, fields, records) = four_by_four();
    let assembler = assembler(2, 2);

    let first = assembler.split(&domain, &fields, &records, &root).unwrap();
    assert!(!first.was_reused());
    let before = snapshot(&root);

    let second = assembler.split(&domain, &fields, &records, &root).unwrap();
    assert!(second.was_reused());
    assert_eq!(second.fields(), first.fields());
    assert_eq!(snapshot(&root), before);
}

#[test]
fn test_sparse_field_merges_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let (domain, fields, records) = four_by_four();
    let assembler = assembler(2, 2);
    let set = assembler.split(&domain, &fields, &records, &root).unwrap();

    // 子域 1 拥有 uid 2, 3, 6, 7
    fs::remove_file(root.join("sdd1").join("rho.dat")).unwrap();
    let merged = assembler.merge(&set, &dir.path().join("merged")).unwrap();
    let rho = merged.fields.field("rho").unwrap();
    for uid in [2, 3, 6, 7] {
        assert_eq!(rho.get(CellUid::new(uid)), Some(0.0));
    }
    assert_eq!(rho.get(CellUid::new(0)), Some(1.0));
    assert_eq!(rho.get(CellUid::new(15)), Some(0.125));
}

#[test]
fn test_remerge_into_same_output_is_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let out = dir.path().join("merged");
    let case = PeriodicTransport::new(GlobalDomain::new(1.0, 1.0, 4, 4));
    let assembler = assembler(2, 2);
    let set = assembler.split_case(&case, &root).unwrap();

    assembler.merge(&set, &out).unwrap();
    assert!(out.join("rhou_x.dat").exists());

    // 外部计算删除了所有子域的 rhou_x
    for k in 0..4 {
        fs::remove_file(root.join(format!("sdd{}", k)).join("rhou_x.dat")).unwrap();
    }
    fs::write(out.join("leftover.txt"), "old").unwrap();
    assembler.merge(&set, &out).unwrap();

    let reread = GlobalDataset::read(&out).unwrap();
    assert!(reread.fields.is_absent("rhou_x"));
    assert_eq!(reread.fields.value("rhou_x", CellUid::new(0)), 0.0);
    assert_eq!(reread.fields.field("rho"), case.fields().unwrap().field("rho"));
    assert!(!out.join("rhou_x.dat").exists());
    assert!(!out.join("leftover.txt").exists());

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().all(|n| !n.starts_with(".gs_stage_")));
}

#[test]
fn test_lossy_float_format_refused() {
    let config = PartitionConfig {
        float_format: FloatFormat::Scientific(6),
        ..PartitionConfig::with_shape(2, 2)
    };
    let err = DatasetAssembler::new(config).unwrap_err();
    assert!(err.is_configuration());

    // 17 位有效数字可以逐值往返
    let dir = tempfile::tempdir().unwrap();
    let config = PartitionConfig {
        float_format: FloatFormat::Scientific(FloatFormat::ROUND_TRIP_DIGITS),
        ..PartitionConfig::with_shape(2, 2)
    };
    let assembler = DatasetAssembler::new(config).unwrap();
    let domain = GlobalDomain::new(1.0, 1.0, 4, 4).with_partition(2, 2);
    let mut fields = FieldSet::new(16);
    fields
        .insert(Field::from_fn("rho", 16, |u| 1.0 / (u.get() as f64 + 3.0)))
        .unwrap();
    let set = assembler
        .split(&domain, &fields, &[], &dir.path().join("2x2"))
        .unwrap();
    let merged = assembler.merge(&set, &dir.path().join("merged")).unwrap();
    assert_eq!(merged.fields.field("rho"), fields.field("rho"));
}

#[test]
fn test_indivisible_grid_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("3x1");
    let domain = GlobalDomain::new(1.0, 1.0, 100, 10).with_partition(3, 1);
    let mut fields = FieldSet::new(1000);
    fields.insert(Field::zeros("rho", 1000)).unwrap();

    let err = assembler(3, 1)
        .split(&domain, &fields, &[], &root)
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(!root.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_out_of_shape_shard_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let (domain, fields, records) = four_by_four();
    let assembler = assembler(2, 2);
    let set = assembler.split(&domain, &fields, &records, &root).unwrap();

    let rho = root.join("sdd2").join("rho.dat");
    let mut text = fs::read_to_string(&rho).unwrap();
    text.push_str("0 2 1\n");
    fs::write(&rho, text).unwrap();

    let err = assembler.merge(&set, &dir.path().join("merged")).unwrap_err();
    assert!(err.is_shape_mismatch());
    assert!(!validate_split(&root).unwrap().is_valid());
}

#[test]
fn test_open_existing_split() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("2x2");
    let (domain, fields, records) = four_by_four();
    assembler(2, 2).split(&domain, &fields, &records, &root).unwrap();

    let set = SubdomainDatasetSet::open(&root).unwrap();
    assert_eq!(set.domain(), &domain);
    assert_eq!(set.fields(), ["rho".to_string()]);
    assert!(!set.was_reused());
}

#[test]
fn test_split_file_case() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("global");
    let case = PeriodicTransport::new(GlobalDomain::new(1.0, 1.0, 8, 4));
    GlobalDataset::write(
        &global,
        &case.domain(),
        &case.fields().unwrap(),
        &case.boundary_records().unwrap(),
        Default::default(),
    )
    .unwrap();

    let file_case = FileCase::open(&global).unwrap();
    let assembler = assembler(2, 1);
    let set = assembler.split_case(&file_case, &dir.path().join("2x1")).unwrap();
    let merged = assembler.merge(&set, &dir.path().join("merged")).unwrap();
    assert_eq!(merged.fields.field("rho"), case.fields().unwrap().field("rho"));
    assert_eq!(merged.boundary.len(), case.boundary_records().unwrap().len());
}
