// ==========================================
// 考场座位编排引擎 - 固定考生落位
// ==========================================
// 职责: 将固定考生放入其声明的考场/座位
// 红线: 固定座位是硬约束,任何冲突都中止整次运行
// 红线: 冲突必须全部汇总后再中止（不 fail fast）
// ==========================================
// 冲突类型:
//   - 考场不存在或未启用
//   - 座位未定义 / 座位未启用
//   - 座位表登记的占用者不是该考生
//   - 座位已被先处理的固定考生占用
// ==========================================

use crate::domain::member::Member;
use crate::domain::placement::{Placement, WarningKind};
use crate::domain::types::{AdjacencyScope, GroupKey, MemberId, RoomId};
use crate::engine::error::EngineError;
use crate::engine::topology::{SeatLookup, SeatTopology};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};

/// 已被固定考生占用的座位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupiedSeat {
    pub member_id: MemberId,
    pub member_name: String,
    pub group: GroupKey,
}

/// 固定考生落位结果
#[derive(Debug, Clone, Default)]
pub struct PinnedLayout {
    pub placements: Vec<Placement>,
    /// 考场 → (座位号 → 占用者)
    pub occupied: HashMap<RoomId, BTreeMap<u32, OccupiedSeat>>,
}

impl PinnedLayout {
    pub fn is_occupied(&self, room_id: RoomId, seat_number: u32) -> bool {
        self.occupied
            .get(&room_id)
            .map(|seats| seats.contains_key(&seat_number))
            .unwrap_or(false)
    }

    pub fn occupant(&self, room_id: RoomId, seat_number: u32) -> Option<&OccupiedSeat> {
        self.occupied.get(&room_id).and_then(|seats| seats.get(&seat_number))
    }

    pub fn occupied_count(&self, room_id: RoomId) -> usize {
        self.occupied.get(&room_id).map(BTreeMap::len).unwrap_or(0)
    }
}

// ==========================================
// PinnedPlacer - 固定考生落位器
// ==========================================
#[derive(Debug, Default)]
pub struct PinnedPlacer {
    // 无状态
}

impl PinnedPlacer {
    pub fn new() -> Self {
        Self {}
    }

    /// 放置固定考生
    ///
    /// # 参数
    /// - pinned: 固定考生（均携带 PinTarget）
    /// - topologies: 启用考场的座位拓扑
    ///
    /// # 返回
    /// - Ok(PinnedLayout): 全部成功
    /// - Err(Vec<EngineError>): 汇总的全部冲突
    #[instrument(skip_all, fields(pinned_count = pinned.len()))]
    pub fn place(
        &self,
        pinned: &[&Member],
        topologies: &HashMap<RoomId, SeatTopology>,
    ) -> Result<PinnedLayout, Vec<EngineError>> {
        let mut layout = PinnedLayout::default();
        let mut errors = Vec::new();

        for member in pinned {
            let Some(target) = member.pin else {
                continue;
            };
            let member_name = member.display_name();

            let Some(topology) = topologies.get(&target.room_id) else {
                errors.push(EngineError::PinnedRoomUnavailable {
                    member: member_name,
                    room_id: target.room_id,
                });
                continue;
            };

            let seat = match topology.resolve(target.seat) {
                SeatLookup::Active(seat) => seat,
                SeatLookup::Inactive(seat) => {
                    errors.push(EngineError::PinnedSeatInactive {
                        member: member_name,
                        room_name: topology.room_name().to_string(),
                        seat_number: seat.number,
                    });
                    continue;
                }
                SeatLookup::Missing => {
                    errors.push(EngineError::PinnedSeatNotFound {
                        member: member_name,
                        room_name: topology.room_name().to_string(),
                        seat: target.seat.to_string(),
                    });
                    continue;
                }
            };

            if let Some(owner) = seat.owner.filter(|&owner| owner != member.id) {
                errors.push(EngineError::PinnedSeatReserved {
                    member: member_name,
                    owner,
                    room_name: topology.room_name().to_string(),
                    seat_number: seat.number,
                });
                continue;
            }

            let room_seats = layout.occupied.entry(target.room_id).or_default();
            if let Some(holder) = room_seats.get(&seat.number) {
                errors.push(EngineError::PinnedSeatTaken {
                    member: member_name,
                    holder: holder.member_name.clone(),
                    room_name: topology.room_name().to_string(),
                    seat_number: seat.number,
                });
                continue;
            }

            room_seats.insert(
                seat.number,
                OccupiedSeat {
                    member_id: member.id,
                    member_name: member_name.clone(),
                    group: member.group.clone(),
                },
            );

            debug!(
                member_id = %member.id,
                room = topology.room_name(),
                seat_number = seat.number,
                "固定考生落位"
            );

            layout.placements.push(Placement {
                member_id: member.id,
                member_name,
                room_id: target.room_id,
                room_name: topology.room_name().to_string(),
                seat_number: seat.number,
                seat_label: seat.label.clone(),
                group: member.group.clone(),
                pinned: true,
                overflow: false,
            });
        }

        if errors.is_empty() {
            Ok(layout)
        } else {
            warn!(conflict_count = errors.len(), "固定考生座位冲突");
            Err(errors)
        }
    }

    /// 找出相邻且冲突键相同的固定考生对（只提示，不调整）
    pub fn neighbor_conflicts(
        &self,
        layout: &PinnedLayout,
        topologies: &HashMap<RoomId, SeatTopology>,
        scope: AdjacencyScope,
    ) -> Vec<WarningKind> {
        let mut room_ids: Vec<&RoomId> = layout.occupied.keys().collect();
        room_ids.sort();

        let mut conflicts = Vec::new();
        for room_id in room_ids {
            let (Some(topology), Some(seats)) =
                (topologies.get(room_id), layout.occupied.get(room_id))
            else {
                continue;
            };
            for (a, b) in topology.adjacency_pairs() {
                let (Some(first), Some(second)) = (seats.get(&a), seats.get(&b)) else {
                    continue;
                };
                let key_a = scope.conflict_key(&first.group);
                if key_a == scope.conflict_key(&second.group) {
                    conflicts.push(WarningKind::PinnedNeighborConflict {
                        room_id: *room_id,
                        room_name: topology.room_name().to_string(),
                        seat_a: a,
                        seat_b: b,
                        conflict_key: key_a,
                    });
                }
            }
        }
        conflicts
    }
}
