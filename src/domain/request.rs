// ==========================================
// SeatingRequest - 单次编排的输入快照
// ==========================================
// 来源: 持久化层提供的考生/考场/座位表快照
// 红线: 引擎只读快照,不回写
// ==========================================

use crate::domain::member::Member;
use crate::domain::room::{Room, Seat};
use crate::domain::types::RoomId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatingRequest {
    pub members: Vec<Member>,
    pub rooms: Vec<Room>,

    /// 显式座位表（考场 ID → 座位列表）；缺省时按容量生成 1..=capacity
    #[serde(default)]
    pub seat_maps: HashMap<RoomId, Vec<Seat>>,
}

impl SeatingRequest {
    pub fn new(members: Vec<Member>, rooms: Vec<Room>) -> Self {
        Self {
            members,
            rooms,
            seat_maps: HashMap::new(),
        }
    }

    pub fn with_seat_map(mut self, room_id: RoomId, seats: Vec<Seat>) -> Self {
        self.seat_maps.insert(room_id, seats);
        self
    }

    pub fn seats_for(&self, room_id: RoomId) -> Option<&[Seat]> {
        self.seat_maps
            .get(&room_id)
            .map(Vec::as_slice)
            .filter(|seats| !seats.is_empty())
    }
}
