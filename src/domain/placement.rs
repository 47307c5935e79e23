// ==========================================
// 编排结果领域模型
// ==========================================
// Placement: 单个考生的落位记录
// RoomStatistics / SeatingStatistics: 占用统计
// SeatingWarning: 非致命提示（讲台备用座、固定考生相邻同班）
// ==========================================

use crate::domain::types::{GroupKey, MemberId, RoomId, SolveMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// Placement - 落位记录
// ==========================================
// 红线: 单次运行内每个考生至多一条; 每个 (考场, 座位号) 至多一人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub member_id: MemberId,
    pub member_name: String,
    pub room_id: RoomId,
    pub room_name: String,
    pub seat_number: u32,
    pub seat_label: Option<String>,
    pub group: GroupKey,
    pub pinned: bool,
    pub overflow: bool, // 讲台备用座
}

impl Placement {
    /// 落位键 (考场, 座位号)
    pub fn seat_key(&self) -> (RoomId, u32) {
        (self.room_id, self.seat_number)
    }

    /// 座位展示: "005" 或 "005 - 窗边"
    pub fn seat_display(&self) -> String {
        match self.seat_label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(label) => format!("{:03} - {}", self.seat_number, label),
            None => format!("{:03}", self.seat_number),
        }
    }
}

// ==========================================
// 统计
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomStatistics {
    pub room_id: RoomId,
    pub room_name: String,
    pub capacity: u32,
    pub occupancy: usize,
    pub overflow_count: usize,
    /// 填充率百分比 occupancy / capacity * 100，保留两位小数；capacity 为 0 时为 0
    pub fill_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingStatistics {
    pub total_members: usize,
    pub placed: usize,
    pub rooms_used: usize,
    pub rooms_available: usize,
    pub overflow_placements: usize,
    pub solve_mode: SolveMode,
    pub rooms: Vec<RoomStatistics>,
    /// 分组键 → 人数
    pub group_distribution: BTreeMap<String, usize>,
}

// ==========================================
// SeatingWarning - 非致命提示
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    /// 第二阶段: 某考场有考生被安排到讲台备用座
    OverflowUsed {
        room_id: RoomId,
        room_name: String,
        count: usize,
    },
    /// 两名固定考生坐在相邻座位且冲突键相同（固定座位不做调整）
    PinnedNeighborConflict {
        room_id: RoomId,
        room_name: String,
        seat_a: u32,
        seat_b: u32,
        conflict_key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingWarning {
    pub kind: WarningKind,
    pub message: String,
}
