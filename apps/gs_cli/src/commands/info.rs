// apps/gs_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 识别拆分目录或全局数据集并打印概要；无输入时打印默认配置。

use anyhow::{Context, Result};
use clap::Args;
use gs_config::PartitionConfig;
use gs_io::format::{DOMAIN_INFO, GLOBAL_DOMAIN};
use gs_io::{GlobalDataset, SubdomainDatasetSet};
use gs_partition::CoordinateSpace;
use std::path::{Path, PathBuf};
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 拆分目录或全局数据集目录
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// 显示默认配置 (JSON)
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== GridSplit 信息 ===");

    if args.defaults || args.input.is_none() {
        print_default_config()?;
    }

    if let Some(input) = &args.input {
        if input.join(DOMAIN_INFO).is_file() {
            print_split(input)?;
        } else if input.join(GLOBAL_DOMAIN).is_file() {
            print_global(input)?;
        } else {
            anyhow::bail!(
                "{} 中既没有 {} 也没有 {}",
                input.display(),
                DOMAIN_INFO,
                GLOBAL_DOMAIN
            );
        }
    }
    Ok(())
}

fn print_default_config() -> Result<()> {
    println!("=== 默认配置 ===");
    let json = serde_json::to_string_pretty(&PartitionConfig::default())?;
    println!("{}", json);
    Ok(())
}

fn print_split(root: &Path) -> Result<()> {
    let set = SubdomainDatasetSet::open(root)
        .with_context(|| format!("无法读取 {}", root.display()))?;
    let d = set.domain();
    let space = CoordinateSpace::new(d)?;
    let (sx, sy) = space.subdomain_size();

    println!("=== 拆分目录 {} ===", root.display());
    println!("网格: {}x{} 单元, 长度 {} x {}", d.nx, d.ny, d.lx, d.ly);
    println!("子域: {}x{} = {} 个, 每个 {}x{} 单元", d.px, d.py, set.subdomain_count(), sx, sy);
    println!("ghost 层数: {} ({} 个 ghost 单元)", d.ghost_layers, space.ghost_count());
    println!("字段: {}", set.fields().join(", "));
    Ok(())
}

fn print_global(root: &Path) -> Result<()> {
    let dataset = GlobalDataset::read(root)
        .with_context(|| format!("无法读取 {}", root.display()))?;
    let d = &dataset.domain;

    println!("=== 全局数据集 {} ===", root.display());
    println!("网格: {}x{} 单元, 长度 {} x {}", d.nx, d.ny, d.lx, d.ly);
    println!("ghost 层数: {}", d.ghost_layers);
    println!("边界记录: {} 条", dataset.boundary.len());
    println!("字段:");
    for (name, field) in dataset.fields.iter() {
        match field {
            Some(f) => {
                let (min, max) = f
                    .values()
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                println!("  {} [{}, {}]", name, min, max);
            }
            None => println!("  {} (缺失)", name),
        }
    }
    Ok(())
}
