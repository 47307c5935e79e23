// ==========================================
// 考场座位编排引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 所有致命错误以数据形式返回 AssignmentOutcome, 不跨调用边界 panic
// ==========================================

use crate::domain::types::{MemberId, RoomId};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Input,          // 输入错误（求解前）
    PinnedConflict, // 固定座位冲突（汇总后中止）
    Infeasible,     // 两阶段均无解
    SolverBackend,  // 求解后端故障（环境问题，非问题本身无解）
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "INPUT"),
            ErrorKind::PinnedConflict => write!(f, "PINNED_CONFLICT"),
            ErrorKind::Infeasible => write!(f, "INFEASIBLE"),
            ErrorKind::SolverBackend => write!(f, "SOLVER_BACKEND"),
        }
    }
}

/// 引擎致命错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 输入错误 =====
    #[error("考生列表为空")]
    EmptyMembers,

    #[error("考场列表为空（无可用考场）")]
    EmptyRooms,

    #[error("考场容量不足: 考生 {members} 人, 总容量 {capacity}")]
    InsufficientCapacity { members: usize, capacity: u64 },

    #[error("考生 ID 重复: {member_id}")]
    DuplicateMember { member_id: MemberId },

    #[error("考场 ID 重复: {room_id}")]
    DuplicateRoom { room_id: RoomId },

    #[error("考场 {room_name} 容量无效: {capacity}（至少为 1）")]
    InvalidRoomCapacity { room_name: String, capacity: u32 },

    #[error("考场 {room_name} 座位表中座位号 {seat_number} 重复")]
    DuplicateSeatNumber { room_name: String, seat_number: u32 },

    #[error("考场 {room_name} 座位号 {seat_number} 无效（有效范围 1..{limit}）")]
    InvalidSeatNumber {
        room_name: String,
        seat_number: u32,
        limit: u32,
    },

    #[error("考场 {room_name} 有效座位数 {active_seats} 超过容量 {capacity}")]
    SeatCountExceedsCapacity {
        room_name: String,
        active_seats: usize,
        capacity: u32,
    },

    // ===== 固定座位冲突 =====
    #[error("固定考生 {member} 指定的考场 {room_id} 不存在或未启用")]
    PinnedRoomUnavailable { member: String, room_id: RoomId },

    #[error("固定考生 {member} 指定的座位 ({seat}) 在考场 {room_name} 中未定义")]
    PinnedSeatNotFound {
        member: String,
        room_name: String,
        seat: String,
    },

    #[error("固定考生 {member} 指定的考场 {room_name} 第 {seat_number:03} 号座位未启用")]
    PinnedSeatInactive {
        member: String,
        room_name: String,
        seat_number: u32,
    },

    #[error("考场 {room_name} 第 {seat_number:03} 号座位已分配给固定考生 {holder}，{member} 不能重复占用")]
    PinnedSeatTaken {
        member: String,
        holder: String,
        room_name: String,
        seat_number: u32,
    },

    #[error("考场 {room_name} 第 {seat_number:03} 号座位属于考生 {owner}，{member} 不能占用")]
    PinnedSeatReserved {
        member: String,
        owner: MemberId,
        room_name: String,
        seat_number: u32,
    },

    // ===== 无解 =====
    #[error("无可行座位安排（含讲台备用座）；请增加考场容量或放宽约束")]
    NoFeasibleSeating,

    // ===== 后端故障 =====
    #[error("求解后端不可用: {0}")]
    SolverBackend(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::EmptyMembers
            | EngineError::EmptyRooms
            | EngineError::InsufficientCapacity { .. }
            | EngineError::DuplicateMember { .. }
            | EngineError::DuplicateRoom { .. }
            | EngineError::InvalidRoomCapacity { .. }
            | EngineError::DuplicateSeatNumber { .. }
            | EngineError::InvalidSeatNumber { .. }
            | EngineError::SeatCountExceedsCapacity { .. } => ErrorKind::Input,
            EngineError::PinnedRoomUnavailable { .. }
            | EngineError::PinnedSeatNotFound { .. }
            | EngineError::PinnedSeatInactive { .. }
            | EngineError::PinnedSeatTaken { .. }
            | EngineError::PinnedSeatReserved { .. } => ErrorKind::PinnedConflict,
            EngineError::NoFeasibleSeating => ErrorKind::Infeasible,
            EngineError::SolverBackend(_) => ErrorKind::SolverBackend,
        }
    }

    /// 不可重试（需要调整输入后再运行）
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::SolverBackend)
    }
}

// 序列化为 {kind, message}，便于调用方直接展示
impl Serialize for EngineError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("EngineError", 2)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_cites_both_numbers() {
        let err = EngineError::InsufficientCapacity {
            members: 10,
            capacity: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains('8'));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        assert_eq!(EngineError::NoFeasibleSeating.kind(), ErrorKind::Infeasible);
        assert_eq!(
            EngineError::SolverBackend("worker panicked".into()).kind(),
            ErrorKind::SolverBackend
        );
        assert!(!EngineError::NoFeasibleSeating.is_retryable());
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(EngineError::EmptyMembers).unwrap();
        assert_eq!(json["kind"], "INPUT");
        assert!(json["message"].as_str().unwrap().contains("考生"));
    }
}
