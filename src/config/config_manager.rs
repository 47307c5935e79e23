// ==========================================
// 考场座位编排引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: JSON 键值文件 + EXAM_SEATING_<KEY> 环境变量覆写
// ==========================================

use crate::config::engine_config_trait::EngineConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::AdjacencyScope;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "EXAM_SEATING_CONFIG";

/// 单项配置覆写的环境变量前缀
pub const CONFIG_ENV_PREFIX: &str = "EXAM_SEATING_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建空配置（所有读取均返回默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径，内容为扁平 JSON 对象（值可以是字符串/数字/布尔）
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let parsed: BTreeMap<String, Value> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let values = parsed
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();

        Ok(Self {
            values,
            source: Some(path.to_path_buf()),
        })
    }

    /// 按约定位置加载配置并应用环境变量覆写
    ///
    /// # 查找顺序
    /// 1. 显式路径
    /// 2. 环境变量 EXAM_SEATING_CONFIG
    /// 3. <系统配置目录>/exam-seating/config.json（不存在时使用默认值）
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut manager = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
                _ => match Self::default_config_path() {
                    Some(path) if path.is_file() => Self::from_file(path)?,
                    _ => Self::new(),
                },
            },
        };

        manager.apply_env_overrides();

        tracing::debug!(
            source = ?manager.source,
            keys = manager.values.len(),
            "配置加载完成"
        );

        Ok(manager)
    }

    /// 默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("exam-seating").join("config.json"))
    }

    /// 应用 EXAM_SEATING_<KEY> 形式的环境变量覆写
    pub fn apply_env_overrides(&mut self) {
        for key in config_keys::ALL {
            let env_key = format!("{}{}", CONFIG_ENV_PREFIX, key.to_uppercase());
            if let Ok(value) = std::env::var(&env_key) {
                tracing::debug!(config_key = key, env_key = %env_key, "环境变量覆写配置");
                self.values.insert(key.to_string(), value);
            }
        }
    }

    /// 设置单项配置
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 读取并解析配置，格式错误时记录告警并回退默认值
    fn parse_or_default<T>(&self, key: &str, default: T) -> T
    where
        T: std::str::FromStr,
    {
        match self.get_config_value(key) {
            None => default,
            Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                default
            }),
        }
    }

    fn parse_bool_or_default(&self, key: &str, default: bool) -> bool {
        match self.get_config_value(key) {
            None => default,
            Some(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "on" => true,
                "0" | "false" | "no" | "n" | "off" => false,
                _ => {
                    tracing::warn!(config_key = key, raw_value = %raw, "布尔配置格式错误，使用默认值");
                    default
                }
            },
        }
    }
}

// ==========================================
// EngineConfigReader Trait 实现
// ==========================================
impl EngineConfigReader for ConfigManager {
    fn get_default_row_width(&self) -> ConfigResult<u32> {
        let width = self.parse_or_default(config_keys::DEFAULT_ROW_WIDTH, defaults::ROW_WIDTH);
        Ok(width.max(1))
    }

    fn get_seed(&self) -> ConfigResult<Option<u64>> {
        match self.get_config_value(config_keys::SEED) {
            None => Ok(None),
            Some(raw) => raw.parse::<u64>().map(Some).map_err(|e| ConfigError::InvalidValue {
                key: config_keys::SEED.to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn get_solve_time_limit(&self) -> ConfigResult<Duration> {
        let secs = self.parse_or_default(
            config_keys::SOLVE_TIME_LIMIT_SECS,
            defaults::SOLVE_TIME_LIMIT_SECS,
        );
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::SOLVE_TIME_LIMIT_SECS.to_string(),
                value: secs.to_string(),
                message: "求解时间上限必须为正数".to_string(),
            });
        }
        Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::InvalidValue {
            key: config_keys::SOLVE_TIME_LIMIT_SECS.to_string(),
            value: secs.to_string(),
            message: e.to_string(),
        })
    }

    fn get_search_workers(&self) -> ConfigResult<usize> {
        let fallback = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(defaults::MAX_SEARCH_WORKERS);
        let workers = self.parse_or_default(config_keys::SEARCH_WORKERS, fallback);
        Ok(workers.max(1))
    }

    fn get_adjacency_scope(&self) -> ConfigResult<AdjacencyScope> {
        Ok(self.parse_or_default(config_keys::ADJACENCY_SCOPE, AdjacencyScope::Group))
    }

    fn get_forbid_same_group_adjacent(&self) -> ConfigResult<bool> {
        Ok(self.parse_bool_or_default(config_keys::FORBID_SAME_GROUP_ADJACENT, true))
    }

    fn get_avoid_pinned_neighbors(&self) -> ConfigResult<bool> {
        Ok(self.parse_bool_or_default(config_keys::AVOID_PINNED_NEIGHBORS, false))
    }

    fn get_locale(&self) -> ConfigResult<String> {
        Ok(self
            .get_config_value(config_keys::LOCALE)
            .unwrap_or(defaults::LOCALE)
            .to_string())
    }
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const ROW_WIDTH: u32 = 2;
    pub const SOLVE_TIME_LIMIT_SECS: f64 = 15.0;
    pub const MAX_SEARCH_WORKERS: usize = 8;
    pub const LOCALE: &str = "zh-CN";
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 座位拓扑
    pub const DEFAULT_ROW_WIDTH: &str = "default_row_width";

    // 求解
    pub const SEED: &str = "seed";
    pub const SOLVE_TIME_LIMIT_SECS: &str = "solve_time_limit_secs";
    pub const SEARCH_WORKERS: &str = "search_workers";

    // 相邻规则
    pub const ADJACENCY_SCOPE: &str = "adjacency_scope";
    pub const FORBID_SAME_GROUP_ADJACENT: &str = "forbid_same_group_adjacent";
    pub const AVOID_PINNED_NEIGHBORS: &str = "avoid_pinned_neighbors";

    // 输出
    pub const LOCALE: &str = "locale";

    pub const ALL: &[&str] = &[
        DEFAULT_ROW_WIDTH,
        SEED,
        SOLVE_TIME_LIMIT_SECS,
        SEARCH_WORKERS,
        ADJACENCY_SCOPE,
        FORBID_SAME_GROUP_ADJACENT,
        AVOID_PINNED_NEIGHBORS,
        LOCALE,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let manager = ConfigManager::new();
        assert_eq!(manager.get_default_row_width().unwrap(), 2);
        assert_eq!(manager.get_seed().unwrap(), None);
        assert_eq!(manager.get_solve_time_limit().unwrap(), Duration::from_secs(15));
        assert!(manager.get_search_workers().unwrap() >= 1);
        assert_eq!(manager.get_adjacency_scope().unwrap(), AdjacencyScope::Group);
        assert!(manager.get_forbid_same_group_adjacent().unwrap());
        assert!(!manager.get_avoid_pinned_neighbors().unwrap());
        assert_eq!(manager.get_locale().unwrap(), "zh-CN");
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::DEFAULT_ROW_WIDTH, "wide");
        manager.set(config_keys::FORBID_SAME_GROUP_ADJACENT, "maybe");
        manager.set(config_keys::ADJACENCY_SCOPE, "row");

        assert_eq!(manager.get_default_row_width().unwrap(), 2);
        assert!(manager.get_forbid_same_group_adjacent().unwrap());
        assert_eq!(manager.get_adjacency_scope().unwrap(), AdjacencyScope::Group);
    }

    #[test]
    fn test_zero_row_width_is_floored() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::DEFAULT_ROW_WIDTH, "0");
        assert_eq!(manager.get_default_row_width().unwrap(), 1);
    }

    #[test]
    fn test_invalid_seed_is_an_error() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::SEED, "-3");
        assert!(matches!(
            manager.get_seed(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_non_positive_time_limit_is_an_error() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::SOLVE_TIME_LIMIT_SECS, "0");
        assert!(manager.get_solve_time_limit().is_err());
    }

    #[test]
    fn test_oversized_time_limit_is_an_error() {
        let mut manager = ConfigManager::new();
        manager.set(config_keys::SOLVE_TIME_LIMIT_SECS, "1e300");
        assert!(matches!(
            manager.get_solve_time_limit(),
            Err(ConfigError::InvalidValue { .. })
        ));

        manager.set(config_keys::SOLVE_TIME_LIMIT_SECS, "2.5");
        assert_eq!(manager.get_solve_time_limit().unwrap(), Duration::from_millis(2500));
    }
}
