// ==========================================
// 考场座位编排引擎 - 配置层
// ==========================================
// 职责: 引擎配置管理,支持文件 + 环境变量覆写
// ==========================================

pub mod config_manager;
pub mod engine_config;
pub mod engine_config_trait;
pub mod error;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::EngineConfig;
pub use engine_config_trait::EngineConfigReader;
pub use error::{ConfigError, ConfigResult};
