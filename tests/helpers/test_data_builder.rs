// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use exam_seating::domain::{Member, Room, Seat, SeatRef, SeatingRequest};
use exam_seating::{EngineConfig, RoomId, SeatId};
use std::time::Duration;

// ==========================================
// SeatingRequest 构建器
// ==========================================

pub struct RequestBuilder {
    members: Vec<Member>,
    rooms: Vec<Room>,
    seat_maps: Vec<(RoomId, Vec<Seat>)>,
    next_id: u64,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            rooms: Vec::new(),
            seat_maps: Vec::new(),
            next_id: 1,
        }
    }

    pub fn room(mut self, id: u64, name: &str, capacity: u32) -> Self {
        self.rooms.push(Room::new(id, name, capacity));
        self
    }

    pub fn room_with_width(mut self, id: u64, name: &str, capacity: u32, row_width: u32) -> Self {
        self.rooms
            .push(Room::new(id, name, capacity).with_row_width(row_width));
        self
    }

    pub fn inactive_room(mut self, id: u64, name: &str, capacity: u32) -> Self {
        self.rooms.push(Room::new(id, name, capacity).inactive());
        self
    }

    pub fn seat_map(mut self, room_id: u64, seats: Vec<Seat>) -> Self {
        self.seat_maps.push((RoomId(room_id), seats));
        self
    }

    /// 追加 count 名同组流动考生
    pub fn mobiles(mut self, group: &str, count: usize) -> Self {
        for _ in 0..count {
            let id = self.take_id();
            self.members
                .push(Member::mobile(id, group).with_name(format!("Student {}", id)));
        }
        self
    }

    /// 追加按座位号固定的考生
    pub fn pinned(mut self, group: &str, room_id: u64, seat_number: u32) -> Self {
        let id = self.take_id();
        self.members.push(
            Member::pinned(id, group, room_id, SeatRef::Number(seat_number))
                .with_name(format!("Pinned {}", id)),
        );
        self
    }

    /// 追加按座位 ID 固定的考生
    pub fn pinned_by_seat_id(mut self, group: &str, room_id: u64, seat_id: u64) -> Self {
        let id = self.take_id();
        self.members.push(Member::pinned(
            id,
            group,
            room_id,
            SeatRef::Id(SeatId(seat_id)),
        ));
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn build(self) -> SeatingRequest {
        let mut request = SeatingRequest::new(self.members, self.rooms);
        for (room_id, seats) in self.seat_maps {
            request = request.with_seat_map(room_id, seats);
        }
        request
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 配置
// ==========================================

/// 固定种子、双线程、10 秒上限
pub fn test_config(seed: u64) -> EngineConfig {
    EngineConfig::default()
        .with_seed(seed)
        .with_workers(2)
        .with_time_limit(Duration::from_secs(10))
}
