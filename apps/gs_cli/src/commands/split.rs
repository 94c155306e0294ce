// apps/gs_cli/src/commands/split.rs

//! 拆分命令

use anyhow::{Context, Result};
use clap::Args;
use gs_config::{ParallelStrategy, PartitionConfig};
use gs_io::{DatasetAssembler, FileCase};
use gs_partition::CaseDefinition;
use std::path::PathBuf;
use tracing::{info, warn};

/// 拆分参数
#[derive(Args)]
pub struct SplitArgs {
    /// 全局数据集目录
    #[arg(short, long)]
    pub input: PathBuf,

    /// 配置文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// x 方向子域数
    #[arg(long)]
    pub px: Option<usize>,

    /// y 方向子域数
    #[arg(long)]
    pub py: Option<usize>,

    /// ghost 层数（输入没有边界记录时生效）
    #[arg(short, long)]
    pub ghost: Option<usize>,

    /// 分区输出根目录，结果写入 `<ROOT>/<Px>x<Py>`
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 并行策略 (sequential, parallel, auto)
    #[arg(long)]
    pub parallel: Option<ParallelStrategy>,
}

/// 命令行参数覆盖配置文件
fn resolve_config(args: &SplitArgs) -> Result<PartitionConfig> {
    let mut config = match &args.config {
        Some(path) => PartitionConfig::from_file(path)
            .with_context(|| format!("无法加载配置 {}", path.display()))?,
        None => PartitionConfig::default(),
    };
    if let Some(px) = args.px {
        config.px = px;
    }
    if let Some(py) = args.py {
        config.py = py;
    }
    if let Some(ghost) = args.ghost {
        config.ghost_layers = ghost;
    }
    if let Some(root) = &args.output {
        config.output_root = root.clone();
    }
    if let Some(strategy) = args.parallel {
        config.parallel = strategy;
    }
    config.validate().context("配置无效")?;
    Ok(config)
}

/// 执行拆分命令
pub fn execute(args: SplitArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let case = FileCase::open(&args.input)
        .with_context(|| format!("无法读取全局数据集 {}", args.input.display()))?;

    let mut domain = case.domain().with_partition(config.px, config.py);
    if domain.ghost_layers == 0 {
        domain = domain.with_ghost_layers(config.ghost_layers);
    } else if args.ghost.is_some_and(|g| g != domain.ghost_layers) {
        warn!(
            "输入边界记录为 {} 层, 忽略 --ghost",
            domain.ghost_layers
        );
    }

    let target = config.partition_dir();
    info!(
        "拆分 {} -> {} ({}x{}, {} 层 ghost, 策略 {})",
        args.input.display(),
        target.display(),
        config.px,
        config.py,
        domain.ghost_layers,
        config.parallel
    );

    let fields = case.fields()?;
    let records = case.boundary_records()?;
    let assembler = DatasetAssembler::new(config)?;
    let set = assembler
        .split(&domain, &fields, &records, &target)
        .with_context(|| format!("拆分到 {} 失败", target.display()))?;

    if set.was_reused() {
        info!("复用已有分区 {}", set.root().display());
    } else {
        info!(
            "已写出 {} 个子域, 字段: {}",
            set.subdomain_count(),
            set.fields().join(", ")
        );
    }
    Ok(())
}
