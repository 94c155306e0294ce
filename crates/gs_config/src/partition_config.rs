// crates/gs_config/src/partition_config.rs

//! 分区配置
//!
//! JSON 格式，所有字段都有默认值，缺省项可省略：
//!
//! ```json
//! { "px": 2, "py": 2, "ghost_layers": 1, "parallel": "auto" }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::parallel::{FloatFormat, ParallelStrategy};

/// ghost 层数上限
pub const MAX_GHOST_LAYERS: usize = 64;

/// 分区配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// x 方向子域数
    #[serde(default = "default_px")]
    pub px: usize,
    /// y 方向子域数
    #[serde(default = "default_py")]
    pub py: usize,
    /// 边界 ghost 层数 L
    #[serde(default = "default_ghost_layers")]
    pub ghost_layers: usize,
    /// 拆分输出根目录
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// 分区目录名，缺省为 `<Px>x<Py>`
    #[serde(default)]
    pub layout_name: Option<String>,
    /// 并行策略
    #[serde(default)]
    pub parallel: ParallelStrategy,
    /// `auto` 策略下启用并行的最小单元数
    #[serde(default = "default_auto_threshold")]
    pub auto_threshold: usize,
    /// 场值写出格式
    #[serde(default)]
    pub float_format: FloatFormat,
}

fn default_px() -> usize {
    1
}
fn default_py() -> usize {
    1
}
fn default_ghost_layers() -> usize {
    1
}
fn default_output_root() -> PathBuf {
    PathBuf::from("split")
}
fn default_auto_threshold() -> usize {
    4096
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            px: default_px(),
            py: default_py(),
            ghost_layers: default_ghost_layers(),
            output_root: default_output_root(),
            layout_name: None,
            parallel: ParallelStrategy::default(),
            auto_threshold: default_auto_threshold(),
            float_format: FloatFormat::default(),
        }
    }
}

impl PartitionConfig {
    /// 指定分区形状，其余取默认值
    pub fn with_shape(px: usize, py: usize) -> Self {
        Self {
            px,
            py,
            ..Self::default()
        }
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;

        let config: PartitionConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    ///
    /// 整除性依赖网格尺寸，在分区时检查。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.px == 0 {
            return Err(ConfigError::invalid_value("px", self.px, "子域数必须为正"));
        }
        if self.py == 0 {
            return Err(ConfigError::invalid_value("py", self.py, "子域数必须为正"));
        }
        if self.ghost_layers > MAX_GHOST_LAYERS {
            return Err(ConfigError::invalid_value(
                "ghost_layers",
                self.ghost_layers,
                format!("不能超过 {}", MAX_GHOST_LAYERS),
            ));
        }
        if self.auto_threshold == 0 {
            return Err(ConfigError::invalid_value(
                "auto_threshold",
                self.auto_threshold,
                "必须为正",
            ));
        }
        if let FloatFormat::Scientific(digits) = self.float_format {
            if !self.float_format.is_lossless() {
                return Err(ConfigError::invalid_value(
                    "float_format",
                    digits,
                    format!(
                        "有效数字位数不足 {}，拆分/合并无法保证逐值往返",
                        FloatFormat::ROUND_TRIP_DIGITS
                    ),
                ));
            }
        }
        if let Some(name) = &self.layout_name {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::invalid_value(
                    "layout_name",
                    name,
                    "必须是非空的单级目录名",
                ));
            }
        }
        Ok(())
    }

    /// 子域总数
    pub fn subdomain_count(&self) -> usize {
        self.px * self.py
    }

    /// 分区目录名
    pub fn partition_dir_name(&self) -> String {
        self.layout_name
            .clone()
            .unwrap_or_else(|| format!("{}x{}", self.px, self.py))
    }

    /// 分区目录完整路径
    pub fn partition_dir(&self) -> PathBuf {
        self.output_root.join(self.partition_dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PartitionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.subdomain_count(), 1);
        assert_eq!(config.parallel, ParallelStrategy::Auto);
    }

    #[test]
    fn test_invalid_shape() {
        let config = PartitionConfig::with_shape(0, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lossy_float_format_rejected() {
        let mut config = PartitionConfig::default();
        config.float_format = FloatFormat::Scientific(6);
        assert!(config.validate().is_err());

        config.float_format = FloatFormat::Scientific(FloatFormat::ROUND_TRIP_DIGITS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lossy_float_format_rejected_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partition.json");
        std::fs::write(&path, r#"{ "px": 2, "float_format": { "scientific": 6 } }"#).unwrap();
        assert!(PartitionConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_partition_dir() {
        let mut config = PartitionConfig::with_shape(4, 2);
        config.output_root = PathBuf::from("out");
        assert_eq!(config.partition_dir(), PathBuf::from("out").join("4x2"));

        config.layout_name = Some("custom".into());
        assert_eq!(config.partition_dir_name(), "custom");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PartitionConfig =
            serde_json::from_str(r#"{ "px": 3, "parallel": "sequential" }"#).unwrap();
        assert_eq!(config.px, 3);
        assert_eq!(config.py, 1);
        assert_eq!(config.ghost_layers, 1);
        assert_eq!(config.parallel, ParallelStrategy::Sequential);
        assert_eq!(config.float_format, FloatFormat::Shortest);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partition.json");

        let mut config = PartitionConfig::with_shape(2, 3);
        config.float_format = FloatFormat::Scientific(17);
        config.save_to_file(&path).unwrap();

        let loaded = PartitionConfig::from_file(&path).unwrap();
        assert_eq!(loaded.px, 2);
        assert_eq!(loaded.py, 3);
        assert_eq!(loaded.float_format, FloatFormat::Scientific(17));
    }
}
