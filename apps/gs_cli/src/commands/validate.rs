// apps/gs_cli/src/commands/validate.rs

//! 验证命令
//!
//! 检查拆分目录的完整性，可选检查配置文件。

use anyhow::{bail, Context, Result};
use clap::Args;
use gs_config::PartitionConfig;
use gs_foundation::validation::{ValidationError, ValidationReport};
use gs_io::validate_split;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 拆分目录
    #[arg(short, long)]
    pub input: PathBuf,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== GridSplit 拆分目录验证 ===");

    let mut report = validate_split(&args.input)
        .with_context(|| format!("无法检查 {}", args.input.display()))?;

    if let Some(path) = &args.config {
        println!("\n检查配置文件: {}", path.display());
        if let Err(e) = PartitionConfig::from_file(path) {
            let mut config_report = ValidationReport::new();
            config_report.add_error(ValidationError::ConsistencyError {
                message: format!("配置文件 {}: {}", path.display(), e),
            });
            report.merge(config_report);
        }
    }

    print!("{}", report);

    if report.has_errors() {
        error!("验证失败: {} 个错误", report.error_count());
        bail!("{} 未通过验证", args.input.display());
    }
    if report.has_warnings() {
        if args.strict {
            error!("严格模式: {} 个警告视为错误", report.warning_count());
            bail!("{} 未通过严格验证", args.input.display());
        }
        warn!("验证通过, 但有 {} 个警告", report.warning_count());
    } else {
        info!("验证通过");
    }
    Ok(())
}
