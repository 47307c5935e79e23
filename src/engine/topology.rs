// ==========================================
// 考场座位编排引擎 - 座位拓扑
// ==========================================
// 职责: 每个考场的有序座位表 + 基于每排座位数的相邻关系
// 输入: 考场 + 可选显式座位表
// 输出: 按座位号排序的有效座位、ID/座位号索引、相邻座位对
// ==========================================
// 相邻定义 (每排 W 个座位):
//   左 n-1 / 右 n+1: 仅当与 n 在同一排 ((n-1)/W 相同)
//   前 n-W / 后 n+W: 仅当该座位号存在
// 每次运行每个考场只计算一次
// ==========================================

use crate::domain::member::SeatRef;
use crate::domain::room::{Room, Seat};
use crate::domain::types::{RoomId, SeatId};
use crate::engine::error::EngineError;
use crate::engine::seat_pool::OVERFLOW_DESK_BASE;
use std::collections::{BTreeSet, HashMap, HashSet};

/// 座位引用的解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatLookup<'a> {
    Active(&'a Seat),
    Inactive(&'a Seat),
    Missing,
}

#[derive(Debug, Clone)]
pub struct SeatTopology {
    room: Room,
    seats: Vec<Seat>,
    inactive: Vec<Seat>,
    by_id: HashMap<SeatId, usize>,
    by_number: HashMap<u32, usize>,
    row_width: u32,
    neighbors: HashMap<u32, Vec<u32>>,
}

impl SeatTopology {
    /// 构建考场拓扑
    ///
    /// # 参数
    /// - room: 考场
    /// - explicit: 调用方提供的座位表（None 时生成 1..=capacity）
    /// - default_row_width: 考场未指定每排座位数时使用
    pub fn build(room: &Room, explicit: Option<&[Seat]>, default_row_width: u32) -> Self {
        let (mut seats, mut inactive): (Vec<Seat>, Vec<Seat>) = match explicit {
            Some(list) if !list.is_empty() => list.iter().cloned().partition(|s| s.active),
            _ => ((1..=room.capacity).map(Seat::new).collect(), Vec::new()),
        };
        seats.sort_by_key(|s| s.number);
        inactive.sort_by_key(|s| s.number);

        let by_id = seats
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| s.id.map(|id| (id, idx)))
            .collect();
        let by_number: HashMap<u32, usize> = seats
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.number, idx))
            .collect();

        let row_width = match room.row_width {
            Some(w) if w > 0 => w,
            _ => default_row_width.max(1),
        };

        let number_set: HashSet<u32> = by_number.keys().copied().collect();
        let neighbors = seats
            .iter()
            .map(|s| (s.number, seat_neighbors(s.number, row_width, &number_set)))
            .collect();

        Self {
            room: room.clone(),
            seats,
            inactive,
            by_id,
            by_number,
            row_width,
            neighbors,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn room_id(&self) -> RoomId {
        self.room.id
    }

    pub fn room_name(&self) -> &str {
        &self.room.name
    }

    /// 有效座位（按座位号升序）
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    pub fn seat_by_id(&self, id: SeatId) -> Option<&Seat> {
        self.by_id.get(&id).map(|&idx| &self.seats[idx])
    }

    pub fn seat_by_number(&self, number: u32) -> Option<&Seat> {
        self.by_number.get(&number).map(|&idx| &self.seats[idx])
    }

    /// 解析固定座位引用（区分未启用与不存在）
    pub fn resolve(&self, seat: SeatRef) -> SeatLookup<'_> {
        let active = match seat {
            SeatRef::Id(id) => self.seat_by_id(id),
            SeatRef::Number(no) => self.seat_by_number(no),
        };
        if let Some(found) = active {
            return SeatLookup::Active(found);
        }

        let inactive = self.inactive.iter().find(|s| match seat {
            SeatRef::Id(id) => s.id == Some(id),
            SeatRef::Number(no) => s.number == no,
        });
        match inactive {
            Some(found) => SeatLookup::Inactive(found),
            None => SeatLookup::Missing,
        }
    }

    /// 某座位的相邻座位号
    pub fn neighbors(&self, number: u32) -> &[u32] {
        self.neighbors.get(&number).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_adjacent(&self, a: u32, b: u32) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// 无序相邻座位对 (小号, 大号)
    pub fn adjacency_pairs(&self) -> BTreeSet<(u32, u32)> {
        self.neighbors
            .iter()
            .flat_map(|(&a, list)| list.iter().map(move |&b| (a.min(b), a.max(b))))
            .collect()
    }
}

/// 计算座位 n 的相邻座位号
pub fn seat_neighbors(number: u32, row_width: u32, all_numbers: &HashSet<u32>) -> Vec<u32> {
    // 座位号从 1 开始
    if number == 0 {
        return Vec::new();
    }
    let width = row_width.max(1);
    let row_of = |n: u32| (n - 1) / width;
    let row = row_of(number);
    let mut result = Vec::with_capacity(4);

    // 左右
    if number > 1 {
        let left = number - 1;
        if row_of(left) == row && all_numbers.contains(&left) {
            result.push(left);
        }
    }
    if let Some(right) = number.checked_add(1) {
        if row_of(right) == row && all_numbers.contains(&right) {
            result.push(right);
        }
    }

    // 前后
    if number > width {
        let up = number - width;
        if all_numbers.contains(&up) {
            result.push(up);
        }
    }
    if let Some(down) = number.checked_add(width) {
        if all_numbers.contains(&down) {
            result.push(down);
        }
    }

    result
}

/// 校验显式座位表
///
/// - 座位号在 1..OVERFLOW_DESK_BASE 之内（讲台备用座编号不与真实座位重叠）
/// - 座位号唯一
/// - 有效座位不超过容量
pub fn validate_seat_map(room: &Room, seats: &[Seat]) -> Vec<EngineError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for seat in seats {
        if seat.number == 0 || seat.number >= OVERFLOW_DESK_BASE {
            errors.push(EngineError::InvalidSeatNumber {
                room_name: room.name.clone(),
                seat_number: seat.number,
                limit: OVERFLOW_DESK_BASE,
            });
            continue;
        }
        if !seen.insert(seat.number) && reported.insert(seat.number) {
            errors.push(EngineError::DuplicateSeatNumber {
                room_name: room.name.clone(),
                seat_number: seat.number,
            });
        }
    }

    let active_seats = seats.iter().filter(|s| s.active).count();
    if active_seats > room.capacity as usize {
        errors.push(EngineError::SeatCountExceedsCapacity {
            room_name: room.name.clone(),
            active_seats,
            capacity: room.capacity,
        });
    }

    errors
}
