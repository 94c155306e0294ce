// apps/gs_cli/src/main.rs

//! GridSplit 命令行界面
//!
//! 生成全局算例、拆分为子域数据集、合并回全局数据集并检查拆分目录。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// GridSplit 结构化网格分区工具
#[derive(Parser)]
#[command(name = "gs_cli")]
#[command(author = "GridSplit Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Structured 2D grid partitioner", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成内置算例的全局数据集
    Build(commands::build::BuildArgs),
    /// 拆分全局数据集
    Split(commands::split::SplitArgs),
    /// 合并子域数据集
    Merge(commands::merge::MergeArgs),
    /// 显示数据集信息
    Info(commands::info::InfoArgs),
    /// 检查拆分目录
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Split(args) => commands::split::execute(args),
        Commands::Merge(args) => commands::merge::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
