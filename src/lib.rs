// ==========================================
// 考场座位编排引擎 - 核心库
// ==========================================
// 输入: 考生（固定/流动）+ 考场 + 可选座位表
// 输出: 固定座位不变、同班不相邻的座位安排, 必要时启用讲台备用座
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 编排规则与求解
pub mod engine;

// 配置层 - 引擎配置
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AdjacencyScope, EngineStage, GroupKey, MemberId, RoomId, SeatId, SolveMode,
};

// 领域实体
pub use domain::{
    Member, PinTarget, Placement, Room, RoomStatistics, Seat, SeatRef, SeatingRequest,
    SeatingStatistics, SeatingWarning, WarningKind,
};

// 引擎
pub use engine::{
    AssignmentOutcome, EngineError, ErrorKind, SeatingEngine, SeatingEvent, SeatingEventPublisher,
};

// 配置
pub use config::{ConfigError, ConfigManager, EngineConfig, EngineConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 名称
pub const APP_NAME: &str = "考场座位编排引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
