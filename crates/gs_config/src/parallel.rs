// crates/gs_config/src/parallel.rs

//! 并行策略与浮点输出格式
//!
//! 两者都是运行时枚举，由配置文件或命令行选择。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================
// 并行策略
// ============================================================

/// 并行执行策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallelStrategy {
    /// 串行执行
    Sequential,
    /// 始终使用 rayon 并行
    Parallel,
    /// 自动选择（根据问题规模）
    #[default]
    Auto,
}

impl ParallelStrategy {
    /// 获取策略名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Auto => "auto",
        }
    }

    /// 给定工作量与阈值，判断是否并行
    #[inline]
    pub fn should_parallelize(&self, work_items: usize, threshold: usize) -> bool {
        match self {
            Self::Sequential => false,
            Self::Parallel => true,
            Self::Auto => work_items >= threshold,
        }
    }
}

impl fmt::Display for ParallelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 策略解析错误
#[derive(Debug, Clone)]
pub struct StrategyParseError(String);

impl FromStr for ParallelStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "serial" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" | "rayon" => Ok(Self::Parallel),
            "auto" => Ok(Self::Auto),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "无效的并行策略: '{}', 期望 'sequential'、'parallel' 或 'auto'",
            self.0
        )
    }
}

impl std::error::Error for StrategyParseError {}

// ============================================================
// 浮点格式
// ============================================================

/// 场值写出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatFormat {
    /// 最短可往返表示
    #[default]
    Shortest,
    /// 科学计数法，给定有效数字位数
    Scientific(usize),
}

impl FloatFormat {
    /// 双精度完整往返所需的有效数字位数
    pub const ROUND_TRIP_DIGITS: usize = 17;

    /// 格式化单个值
    pub fn format(&self, value: f64) -> String {
        match *self {
            Self::Shortest => format!("{}", value),
            Self::Scientific(digits) => {
                format!("{:.*e}", digits.saturating_sub(1), value)
            }
        }
    }

    /// 写出后再解析是否保证逐值相等
    ///
    /// 多于 17 位的有效数字不再带来精度，同样视为无损。
    pub fn is_lossless(&self) -> bool {
        match *self {
            Self::Shortest => true,
            Self::Scientific(digits) => digits >= Self::ROUND_TRIP_DIGITS,
        }
    }
}
