// apps/gs_cli/src/commands/build.rs

//! 生成内置算例
//!
//! 把内置算例的初始场与边界记录写成全局数据集，作为 `split` 的输入。

use anyhow::{Context, Result};
use clap::Args;
use gs_config::FloatFormat;
use gs_io::GlobalDataset;
use gs_partition::{builtin_case, case::BUILTIN_CASES, CaseDefinition, GlobalDomain};
use std::path::PathBuf;
use tracing::info;

/// 生成参数
#[derive(Args)]
pub struct BuildArgs {
    /// 算例名称
    #[arg(long, default_value = "sod2d")]
    pub case: String,

    /// x 方向单元数
    #[arg(long, default_value = "100")]
    pub nx: usize,

    /// y 方向单元数
    #[arg(long, default_value = "100")]
    pub ny: usize,

    /// x 方向长度
    #[arg(long, default_value = "1.0")]
    pub lx: f64,

    /// y 方向长度
    #[arg(long, default_value = "1.0")]
    pub ly: f64,

    /// ghost 层数
    #[arg(short, long, default_value = "1")]
    pub ghost: usize,

    /// 以 17 位有效数字的科学计数法写出，缺省时使用最短往返格式
    #[arg(long)]
    pub scientific: bool,

    /// 输出目录
    #[arg(short, long, default_value = "global")]
    pub out: PathBuf,
}

/// 执行生成命令
pub fn execute(args: BuildArgs) -> Result<()> {
    let domain =
        GlobalDomain::new(args.lx, args.ly, args.nx, args.ny).with_ghost_layers(args.ghost);
    let case = builtin_case(&args.case, domain)
        .with_context(|| format!("可用算例: {}", BUILTIN_CASES.join(", ")))?;

    info!(
        "生成算例 {}: {}x{} 单元, {} 层 ghost",
        case.name(),
        args.nx,
        args.ny,
        args.ghost
    );

    let format = if args.scientific {
        FloatFormat::Scientific(FloatFormat::ROUND_TRIP_DIGITS)
    } else {
        FloatFormat::Shortest
    };
    let fields = case.fields()?;
    let boundary = case.boundary_records()?;
    GlobalDataset::write(&args.out, &case.domain(), &fields, &boundary, format)
        .with_context(|| format!("写出 {} 失败", args.out.display()))?;

    info!("已写出 {}", args.out.display());
    Ok(())
}
