// ==========================================
// 考生 (Member) 领域模型
// ==========================================
// 固定考生: 携带 PinTarget, 必须落在声明的考场/座位
// 流动考生: 无 PinTarget, 由求解器分配
// ==========================================

use crate::domain::types::{GroupKey, MemberId, RoomId, SeatId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 固定座位的引用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatRef {
    /// 座位持久化 ID
    Id(SeatId),
    /// 座位号（座位由容量自动生成时使用）
    Number(u32),
}

impl fmt::Display for SeatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatRef::Id(id) => write!(f, "seat_id={}", id),
            SeatRef::Number(no) => write!(f, "seat_no={}", no),
        }
    }
}

/// 固定考生的目标位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinTarget {
    pub room_id: RoomId,
    pub seat: SeatRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,

    #[serde(default)]
    pub name: Option<String>,

    pub group: GroupKey,

    #[serde(default)]
    pub pin: Option<PinTarget>,
}

impl Member {
    pub fn mobile(id: u64, group: &str) -> Self {
        Self {
            id: MemberId(id),
            name: None,
            group: GroupKey::from(group),
            pin: None,
        }
    }

    pub fn pinned(id: u64, group: &str, room_id: u64, seat: SeatRef) -> Self {
        Self {
            id: MemberId(id),
            name: None,
            group: GroupKey::from(group),
            pin: Some(PinTarget {
                room_id: RoomId(room_id),
                seat,
            }),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// 展示名称（无姓名时回退为 "ID:{id}"）
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("ID:{}", self.id),
        }
    }
}
