// ==========================================
// EngineConfig - 单次运行的配置快照
// ==========================================
// 运行开始时从 EngineConfigReader 读取一次，运行期间不变
// ==========================================

use crate::config::config_manager::defaults;
use crate::config::engine_config_trait::EngineConfigReader;
use crate::config::error::ConfigResult;
use crate::domain::types::AdjacencyScope;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub default_row_width: u32,
    pub seed: Option<u64>,
    pub solve_time_limit_ms: u64,
    pub search_workers: usize,
    pub adjacency_scope: AdjacencyScope,
    pub forbid_same_group_adjacent: bool,
    pub avoid_pinned_neighbors: bool,
    pub locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_row_width: defaults::ROW_WIDTH,
            seed: None,
            solve_time_limit_ms: (defaults::SOLVE_TIME_LIMIT_SECS * 1000.0) as u64,
            search_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .min(defaults::MAX_SEARCH_WORKERS),
            adjacency_scope: AdjacencyScope::Group,
            forbid_same_group_adjacent: true,
            avoid_pinned_neighbors: false,
            locale: defaults::LOCALE.to_string(),
        }
    }
}

impl EngineConfig {
    /// 从配置读取器构建快照
    pub fn from_reader<R>(reader: &R) -> ConfigResult<Self>
    where
        R: EngineConfigReader + ?Sized,
    {
        Ok(Self {
            default_row_width: reader.get_default_row_width()?,
            seed: reader.get_seed()?,
            solve_time_limit_ms: reader.get_solve_time_limit()?.as_millis() as u64,
            search_workers: reader.get_search_workers()?,
            adjacency_scope: reader.get_adjacency_scope()?,
            forbid_same_group_adjacent: reader.get_forbid_same_group_adjacent()?,
            avoid_pinned_neighbors: reader.get_avoid_pinned_neighbors()?,
            locale: reader.get_locale()?,
        })
    }

    pub fn solve_time_limit(&self) -> Duration {
        Duration::from_millis(self.solve_time_limit_ms.max(1))
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_row_width(mut self, width: u32) -> Self {
        self.default_row_width = width.max(1);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.solve_time_limit_ms = limit.as_millis() as u64;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.search_workers = workers.max(1);
        self
    }

    pub fn with_adjacency_scope(mut self, scope: AdjacencyScope) -> Self {
        self.adjacency_scope = scope;
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }
}
