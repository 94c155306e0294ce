// apps/gs_cli/src/commands/merge.rs

//! 合并命令
//!
//! 读取拆分目录（可能已被外部计算原地更新），写出全局数据集。

use anyhow::{Context, Result};
use clap::Args;
use gs_config::PartitionConfig;
use gs_io::{DatasetAssembler, SubdomainDatasetSet};
use std::path::PathBuf;
use tracing::info;

/// 合并参数
#[derive(Args)]
pub struct MergeArgs {
    /// 拆分目录 (`<ROOT>/<Px>x<Py>`)
    #[arg(short, long)]
    pub input: PathBuf,

    /// 全局数据集输出目录
    #[arg(short, long, default_value = "merged")]
    pub output: PathBuf,

    /// 配置文件路径 (JSON)，决定并行策略与写出格式
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 执行合并命令
pub fn execute(args: MergeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => PartitionConfig::from_file(path)
            .with_context(|| format!("无法加载配置 {}", path.display()))?,
        None => PartitionConfig::default(),
    };

    let set = SubdomainDatasetSet::open(&args.input)
        .with_context(|| format!("{} 不是有效的拆分目录", args.input.display()))?;
    let domain = set.domain();
    info!(
        "合并 {} ({}x{} 网格, {}x{} 子域)",
        args.input.display(),
        domain.nx,
        domain.ny,
        domain.px,
        domain.py
    );

    let assembler = DatasetAssembler::new(config)?;
    let merged = assembler
        .merge(&set, &args.output)
        .with_context(|| format!("合并 {} 失败", args.input.display()))?;

    for (name, field) in merged.fields.iter() {
        match field {
            Some(_) => info!("  字段 {}", name),
            None => info!("  字段 {} (缺失)", name),
        }
    }
    Ok(())
}
