// ==========================================
// 考场座位编排引擎 - 考场与座位领域模型
// ==========================================
// 红线: 同一考场内座位号唯一; 仅 active 座位可参与编排
// ==========================================

use crate::domain::types::{MemberId, RoomId, SeatId};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

// ==========================================
// Room - 考场
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32, // 有效座位数

    /// 每排座位数（None 或 0 时使用引擎默认值）
    #[serde(default)]
    pub row_width: Option<u32>,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl Room {
    pub fn new(id: u64, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: RoomId(id),
            name: name.into(),
            capacity,
            row_width: None,
            active: true,
        }
    }

    pub fn with_row_width(mut self, row_width: u32) -> Self {
        self.row_width = Some(row_width);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

// ==========================================
// Seat - 座位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// 持久化 ID（自动生成的座位没有 ID）
    #[serde(default)]
    pub id: Option<SeatId>,

    pub number: u32,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    /// 固定座位的占用者
    #[serde(default)]
    pub owner: Option<MemberId>,
}

impl Seat {
    pub fn new(number: u32) -> Self {
        Self {
            id: None,
            number,
            label: None,
            active: true,
            owner: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(SeatId(id));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// 登记座位占用者；只有该考生可以固定在此座位
    pub fn with_owner(mut self, member_id: u64) -> Self {
        self.owner = Some(MemberId(member_id));
        self
    }
}
