// ==========================================
// 考场座位编排引擎 - 领域类型定义
// ==========================================
// 职责: 标识符、分组键、运行阶段等基础类型
// 红线: 标识符使用强类型,禁止裸整数在层间传递
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标识符 (Identifiers)
// ==========================================

/// 考生 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

/// 考场 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

/// 座位持久化 ID（由调用方的座位表提供）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 分组键 (Group Key)
// ==========================================
// 格式: "年级-班级"，如 "10-A"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub String);

impl GroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 年级部分（第一个 '-' 之前；无 '-' 时为整个键）
    pub fn grade(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0).trim()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ==========================================
// 相邻规则口径 (Adjacency Scope)
// ==========================================
// Group: 同班（完整分组键）不得相邻
// Grade: 同年级不得相邻（更严格）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjacencyScope {
    #[default]
    Group,
    Grade,
}

impl AdjacencyScope {
    /// 计算参与相邻比较的冲突键
    pub fn conflict_key(&self, group: &GroupKey) -> String {
        match self {
            AdjacencyScope::Group => group.as_str().to_string(),
            AdjacencyScope::Grade => group.grade().to_string(),
        }
    }
}

impl fmt::Display for AdjacencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjacencyScope::Group => write!(f, "GROUP"),
            AdjacencyScope::Grade => write!(f, "GRADE"),
        }
    }
}

impl std::str::FromStr for AdjacencyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GROUP" => Ok(AdjacencyScope::Group),
            "GRADE" => Ok(AdjacencyScope::Grade),
            other => Err(format!("未知的相邻规则口径: {}", other)),
        }
    }
}

// ==========================================
// 编排模式 (Solve Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveMode {
    PinnedOnly, // 仅固定座位，无需求解
    Strict,     // 第一阶段：纯真实座位
    Overflow,   // 第二阶段：启用讲台备用座
}

impl fmt::Display for SolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveMode::PinnedOnly => write!(f, "PINNED_ONLY"),
            SolveMode::Strict => write!(f, "STRICT"),
            SolveMode::Overflow => write!(f, "OVERFLOW"),
        }
    }
}

// ==========================================
// 引擎运行阶段 (Engine Stage)
// ==========================================
// 状态机: Validating → PlacingPinned → BuildingPool → Solving → Assembling → Done
// 终止态 Failed 可由 Validating / PlacingPinned / Solving 进入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineStage {
    Validating,
    PlacingPinned,
    BuildingPool,
    Solving,
    Assembling,
    Done,
    Failed,
}

impl EngineStage {
    /// 状态机允许的迁移
    pub fn can_transition_to(&self, next: EngineStage) -> bool {
        use EngineStage::*;
        matches!(
            (self, next),
            (Validating, PlacingPinned)
                | (Validating, Failed)
                | (PlacingPinned, BuildingPool)
                | (PlacingPinned, Assembling)
                | (PlacingPinned, Failed)
                | (BuildingPool, Solving)
                | (Solving, Assembling)
                | (Solving, Failed)
                | (Assembling, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EngineStage::Done | EngineStage::Failed)
    }
}

impl fmt::Display for EngineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStage::Validating => write!(f, "VALIDATING"),
            EngineStage::PlacingPinned => write!(f, "PLACING_PINNED"),
            EngineStage::BuildingPool => write!(f, "BUILDING_POOL"),
            EngineStage::Solving => write!(f, "SOLVING"),
            EngineStage::Assembling => write!(f, "ASSEMBLING"),
            EngineStage::Done => write!(f, "DONE"),
            EngineStage::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_grade() {
        assert_eq!(GroupKey::from("10-A").grade(), "10");
        assert_eq!(GroupKey::from("Hazırlık-B").grade(), "Hazırlık");
        assert_eq!(GroupKey::from("7").grade(), "7");
    }

    #[test]
    fn test_conflict_key_by_scope() {
        let key = GroupKey::from("9-C");
        assert_eq!(AdjacencyScope::Group.conflict_key(&key), "9-C");
        assert_eq!(AdjacencyScope::Grade.conflict_key(&key), "9");
    }

    #[test]
    fn test_adjacency_scope_parse() {
        assert_eq!("grade".parse::<AdjacencyScope>().unwrap(), AdjacencyScope::Grade);
        assert_eq!(" GROUP ".parse::<AdjacencyScope>().unwrap(), AdjacencyScope::Group);
        assert!("row".parse::<AdjacencyScope>().is_err());
    }

    #[test]
    fn test_stage_transitions() {
        assert!(EngineStage::Validating.can_transition_to(EngineStage::PlacingPinned));
        assert!(EngineStage::PlacingPinned.can_transition_to(EngineStage::Assembling));
        assert!(EngineStage::Solving.can_transition_to(EngineStage::Failed));
        assert!(!EngineStage::BuildingPool.can_transition_to(EngineStage::Failed));
        assert!(!EngineStage::Assembling.can_transition_to(EngineStage::Failed));
        assert!(EngineStage::Done.is_terminal());
    }
}
