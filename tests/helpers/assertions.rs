// ==========================================
// 编排结果不变量检查
// ==========================================

use exam_seating::engine::topology::SeatTopology;
use exam_seating::{AdjacencyScope, AssignmentOutcome, EngineConfig, RoomId, SeatRef, SeatingRequest};
use std::collections::{HashMap, HashSet};

/// 每名考生恰好一条落位
pub fn assert_every_member_placed_once(request: &SeatingRequest, outcome: &AssignmentOutcome) {
    assert!(outcome.success, "编排失败: {:?}", outcome.error_messages());
    assert_eq!(outcome.placements.len(), request.members.len());

    let ids: HashSet<_> = outcome.placements.iter().map(|p| p.member_id).collect();
    assert_eq!(ids.len(), request.members.len(), "存在重复落位");
    for member in &request.members {
        assert!(ids.contains(&member.id), "考生 {} 未落位", member.id);
    }
}

/// 每个 (考场, 座位号) 至多一人
pub fn assert_seats_unique(outcome: &AssignmentOutcome) {
    let mut seen = HashSet::new();
    for placement in &outcome.placements {
        assert!(
            seen.insert(placement.seat_key()),
            "座位重复: {:?}",
            placement.seat_key()
        );
    }
}

/// 固定考生必须在声明的位置
pub fn assert_pinned_fidelity(request: &SeatingRequest, outcome: &AssignmentOutcome, config: &EngineConfig) {
    let topologies = topologies(request, config);
    for member in request.members.iter().filter(|m| m.is_pinned()) {
        let target = member.pin.expect("pinned member");
        let placement = outcome.placement_of(member.id).expect("pinned placement");
        assert!(placement.pinned);
        assert!(!placement.overflow);
        assert_eq!(placement.room_id, target.room_id);

        let expected_number = match target.seat {
            SeatRef::Number(no) => no,
            SeatRef::Id(id) => topologies[&target.room_id]
                .seat_by_id(id)
                .expect("seat id")
                .number,
        };
        assert_eq!(placement.seat_number, expected_number);
    }
}

/// 相邻真实座位上的两名考生（至少一名为流动考生）冲突键不同
pub fn assert_no_mobile_adjacent_conflicts(
    request: &SeatingRequest,
    outcome: &AssignmentOutcome,
    config: &EngineConfig,
) {
    let topologies = topologies(request, config);
    let scope: AdjacencyScope = config.adjacency_scope;

    let mut by_seat = HashMap::new();
    for placement in outcome.placements.iter().filter(|p| !p.overflow) {
        by_seat.insert(placement.seat_key(), placement);
    }

    for (room_id, topology) in &topologies {
        for (a, b) in topology.adjacency_pairs() {
            let (Some(pa), Some(pb)) = (by_seat.get(&(*room_id, a)), by_seat.get(&(*room_id, b)))
            else {
                continue;
            };
            if pa.pinned && pb.pinned {
                continue;
            }
            if !config.avoid_pinned_neighbors && (pa.pinned || pb.pinned) {
                continue;
            }
            assert_ne!(
                scope.conflict_key(&pa.group),
                scope.conflict_key(&pb.group),
                "考场 {} 座位 {} 与 {} 相邻且冲突键相同",
                pa.room_name,
                a,
                b
            );
        }
    }
}

/// 全部不变量
pub fn assert_valid_outcome(request: &SeatingRequest, outcome: &AssignmentOutcome, config: &EngineConfig) {
    assert_every_member_placed_once(request, outcome);
    assert_seats_unique(outcome);
    assert_pinned_fidelity(request, outcome, config);
    if config.forbid_same_group_adjacent {
        assert_no_mobile_adjacent_conflicts(request, outcome, config);
    }
}

fn topologies(request: &SeatingRequest, config: &EngineConfig) -> HashMap<RoomId, SeatTopology> {
    request
        .rooms
        .iter()
        .filter(|r| r.active)
        .map(|room| {
            (
                room.id,
                SeatTopology::build(room, request.seats_for(room.id), config.default_row_width),
            )
        })
        .collect()
}
