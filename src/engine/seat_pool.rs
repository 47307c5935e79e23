// ==========================================
// 考场座位编排引擎 - 候选座位池
// ==========================================
// 职责: 固定考生落位后剩余的可分配座位 + 空闲座位间的相邻关系
// 第一阶段: 仅真实座位
// 第二阶段: 每个考场追加一个讲台备用座（无相邻关系）
// ==========================================
// 红线: 相邻关系基于考场全部有效座位计算（含已被固定考生占用的座位）
// 红线: 涉及固定考生的相邻对不进入空闲座位图,单独记录在 pinned_neighbors
// ==========================================

use crate::domain::types::{GroupKey, RoomId};
use crate::engine::pinned::PinnedLayout;
use crate::engine::topology::SeatTopology;
use tracing::debug;

/// 讲台备用座编号基数
pub const OVERFLOW_DESK_BASE: u32 = 900_000;

/// 考场讲台备用座编号: 900000 + room_id * 100
pub fn overflow_desk_number(room_id: RoomId) -> u32 {
    room_id
        .0
        .checked_mul(100)
        .and_then(|offset| offset.checked_add(u64::from(OVERFLOW_DESK_BASE)))
        .and_then(|number| u32::try_from(number).ok())
        .unwrap_or(u32::MAX)
}

/// 候选座位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSeat {
    pub room_id: RoomId,
    pub room_name: String,
    pub seat_number: u32,
    pub seat_label: Option<String>,
    pub overflow: bool,
}

// ==========================================
// CandidateSeatPool - 候选座位池
// ==========================================
// 座位顺序: 真实座位在前（考场顺序, 座位号升序）, 讲台备用座在后（考场顺序）
#[derive(Debug, Clone)]
pub struct CandidateSeatPool {
    seats: Vec<CandidateSeat>,
    real_count: usize,
    /// 空闲真实座位间的相邻对 (下标小, 下标大)
    adjacency: Vec<(usize, usize)>,
    /// 下标 → 相邻空闲座位下标
    neighbors: Vec<Vec<usize>>,
    /// 下标 → 相邻固定考生的分组键
    pinned_neighbors: Vec<Vec<GroupKey>>,
}

impl CandidateSeatPool {
    /// 构建候选座位池
    ///
    /// # 参数
    /// - topologies: 启用考场拓扑（按考场输入顺序）
    /// - layout: 固定考生落位结果
    /// - include_overflow: 是否追加讲台备用座
    pub fn build<'a>(
        topologies: impl IntoIterator<Item = &'a SeatTopology>,
        layout: &PinnedLayout,
        include_overflow: bool,
    ) -> Self {
        let topologies: Vec<&SeatTopology> = topologies.into_iter().collect();

        let mut seats = Vec::new();
        let mut adjacency = Vec::new();
        let mut pinned_neighbors = Vec::new();

        for topology in &topologies {
            let room_id = topology.room_id();
            let room_start = seats.len();
            let mut index_of = std::collections::HashMap::new();

            for seat in topology.seats() {
                if layout.is_occupied(room_id, seat.number) {
                    continue;
                }
                index_of.insert(seat.number, seats.len());
                seats.push(CandidateSeat {
                    room_id,
                    room_name: topology.room_name().to_string(),
                    seat_number: seat.number,
                    seat_label: seat.label.clone(),
                    overflow: false,
                });
            }

            for idx in room_start..seats.len() {
                let number = seats[idx].seat_number;
                let mut near_pinned = Vec::new();
                for &other in topology.neighbors(number) {
                    if let Some(&other_idx) = index_of.get(&other) {
                        if idx < other_idx {
                            adjacency.push((idx, other_idx));
                        }
                    } else if let Some(occupant) = layout.occupant(room_id, other) {
                        near_pinned.push(occupant.group.clone());
                    }
                }
                pinned_neighbors.push(near_pinned);
            }
        }

        let real_count = seats.len();

        if include_overflow {
            for topology in &topologies {
                seats.push(CandidateSeat {
                    room_id: topology.room_id(),
                    room_name: topology.room_name().to_string(),
                    seat_number: overflow_desk_number(topology.room_id()),
                    seat_label: None,
                    overflow: true,
                });
                pinned_neighbors.push(Vec::new());
            }
        }

        let mut neighbors = vec![Vec::new(); seats.len()];
        for &(a, b) in &adjacency {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }

        debug!(
            real_seats = real_count,
            overflow_seats = seats.len() - real_count,
            adjacency_pairs = adjacency.len(),
            "候选座位池构建完成"
        );

        Self {
            seats,
            real_count,
            adjacency,
            neighbors,
            pinned_neighbors,
        }
    }

    pub fn seats(&self) -> &[CandidateSeat] {
        &self.seats
    }

    pub fn seat(&self, idx: usize) -> &CandidateSeat {
        &self.seats[idx]
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// 真实座位数（下标 0..real_seat_count）
    pub fn real_seat_count(&self) -> usize {
        self.real_count
    }

    /// 讲台备用座数（下标 real_seat_count..len）
    pub fn overflow_seat_count(&self) -> usize {
        self.seats.len() - self.real_count
    }

    pub fn adjacency(&self) -> &[(usize, usize)] {
        &self.adjacency
    }

    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.neighbors[idx]
    }

    pub fn pinned_neighbors(&self, idx: usize) -> &[GroupKey] {
        &self.pinned_neighbors[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{Member, SeatRef};
    use crate::domain::room::Room;
    use crate::engine::pinned::PinnedPlacer;
    use std::collections::HashMap;

    #[test]
    fn test_overflow_desk_number() {
        assert_eq!(overflow_desk_number(RoomId(1)), 900_100);
        assert_eq!(overflow_desk_number(RoomId(37)), 903_700);
        assert_eq!(overflow_desk_number(RoomId(u64::MAX)), u32::MAX);
    }

    #[test]
    fn test_pool_without_pinned() {
        let room = Room::new(1, "A-101", 4);
        let topo = SeatTopology::build(&room, None, 2);
        let pool = CandidateSeatPool::build([&topo], &PinnedLayout::default(), false);

        assert_eq!(pool.len(), 4);
        assert_eq!(pool.real_seat_count(), 4);
        assert_eq!(pool.overflow_seat_count(), 0);
        assert_eq!(pool.adjacency(), &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(pool.neighbors(0), &[1, 2]);
    }

    #[test]
    fn test_pinned_seat_removed_and_recorded() {
        let room = Room::new(1, "A-101", 4);
        let mut topologies = HashMap::new();
        topologies.insert(room.id, SeatTopology::build(&room, None, 2));

        let pinned = Member::pinned(1, "7-A", 1, SeatRef::Number(1));
        let layout = PinnedPlacer::new().place(&[&pinned], &topologies).unwrap();
        let pool = CandidateSeatPool::build(topologies.values(), &layout, true);

        // 真实座位 2,3,4 + 讲台 1 个
        assert_eq!(pool.real_seat_count(), 3);
        assert_eq!(pool.overflow_seat_count(), 1);
        let numbers: Vec<u32> = pool.seats().iter().map(|s| s.seat_number).collect();
        assert_eq!(numbers, vec![2, 3, 4, 900_100]);

        // 座位 2 与 3 都挨着固定考生（1 号座）
        assert_eq!(pool.pinned_neighbors(0), &[GroupKey::from("7-A")]);
        assert_eq!(pool.pinned_neighbors(1), &[GroupKey::from("7-A")]);
        assert!(pool.pinned_neighbors(2).is_empty());

        // 空闲座位图只剩 2-4, 3-4
        assert_eq!(pool.adjacency(), &[(0, 2), (1, 2)]);
        assert!(pool.neighbors(3).is_empty());
        assert!(pool.seat(3).overflow);
    }

    #[test]
    fn test_room_order_is_preserved() {
        let first = Room::new(5, "Z-Hall", 1);
        let second = Room::new(2, "A-Hall", 1);
        let t1 = SeatTopology::build(&first, None, 2);
        let t2 = SeatTopology::build(&second, None, 2);
        let pool = CandidateSeatPool::build([&t1, &t2], &PinnedLayout::default(), true);

        let rooms: Vec<RoomId> = pool.seats().iter().map(|s| s.room_id).collect();
        assert_eq!(rooms, vec![RoomId(5), RoomId(2), RoomId(5), RoomId(2)]);
    }
}
