// ==========================================
// 考场座位编排引擎 - 引擎配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::types::AdjacencyScope;
use std::time::Duration;

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 实现者: ConfigManager（JSON 文件 + 环境变量）
pub trait EngineConfigReader: Send + Sync {
    // ===== 座位拓扑 =====

    /// 获取默认每排座位数（考场未指定时使用）
    ///
    /// # 默认值
    /// - 2
    fn get_default_row_width(&self) -> ConfigResult<u32>;

    // ===== 求解 =====

    /// 获取随机种子（用于流动考生洗牌）
    ///
    /// # 返回
    /// - None: 每次运行使用新的随机种子
    fn get_seed(&self) -> ConfigResult<Option<u64>>;

    /// 获取单阶段求解的时间上限
    ///
    /// # 默认值
    /// - 15 秒
    fn get_solve_time_limit(&self) -> ConfigResult<Duration>;

    /// 获取并行搜索线程数
    ///
    /// # 默认值
    /// - 可用并行度，上限 8
    fn get_search_workers(&self) -> ConfigResult<usize>;

    // ===== 相邻规则 =====

    /// 获取相邻规则口径（同班 / 同年级）
    ///
    /// # 默认值
    /// - GROUP
    fn get_adjacency_scope(&self) -> ConfigResult<AdjacencyScope>;

    /// 是否禁止同一冲突键的考生相邻
    ///
    /// # 默认值
    /// - true
    fn get_forbid_same_group_adjacent(&self) -> ConfigResult<bool>;

    /// 流动考生是否需要避开同一冲突键的固定考生
    ///
    /// # 默认值
    /// - false（固定考生旁允许安排同班流动考生）
    fn get_avoid_pinned_neighbors(&self) -> ConfigResult<bool>;

    // ===== 输出 =====

    /// 获取座位清单/提示语言
    ///
    /// # 默认值
    /// - zh-CN
    fn get_locale(&self) -> ConfigResult<String>;
}
