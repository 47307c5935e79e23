// ==========================================
// 考场座位编排引擎 - 结果汇总
// ==========================================
// 职责: 合并固定/求解落位, 排序, 统计, 生成名单与提示文本
// 排序: (考场名称, 座位号)
// 无失败路径
// ==========================================

use crate::domain::placement::{
    Placement, RoomStatistics, SeatingStatistics, SeatingWarning, WarningKind,
};
use crate::domain::room::Room;
use crate::domain::types::SolveMode;
use crate::i18n;
use std::collections::BTreeMap;

/// 汇总结果
#[derive(Debug, Clone)]
pub struct AssembledResult {
    pub placements: Vec<Placement>,
    pub statistics: SeatingStatistics,
    pub roster: Vec<String>,
    pub warnings: Vec<SeatingWarning>,
}

// ==========================================
// ResultAssembler - 结果汇总器
// ==========================================
#[derive(Debug, Clone)]
pub struct ResultAssembler {
    locale: String,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self::new(i18n::DEFAULT_LOCALE)
    }
}

impl ResultAssembler {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: i18n::resolve_locale(locale).to_string(),
        }
    }

    /// 汇总
    ///
    /// # 参数
    /// - total_members: 输入考生总数
    /// - rooms: 启用考场（输入顺序）
    /// - pinned / solved: 固定与求解落位
    /// - solve_mode: 编排模式
    /// - warnings: 提示
    pub fn assemble(
        &self,
        total_members: usize,
        rooms: &[&Room],
        pinned: Vec<Placement>,
        solved: Vec<Placement>,
        solve_mode: SolveMode,
        warnings: Vec<WarningKind>,
    ) -> AssembledResult {
        let mut placements = pinned;
        placements.extend(solved);
        placements.sort_by(|a, b| {
            a.room_name
                .cmp(&b.room_name)
                .then(a.room_id.cmp(&b.room_id))
                .then(a.seat_number.cmp(&b.seat_number))
        });

        let statistics = self.statistics(total_members, rooms, &placements, solve_mode);
        let roster = self.roster(&placements);
        let warnings = warnings
            .into_iter()
            .map(|kind| SeatingWarning {
                message: self.warning_message(&kind),
                kind,
            })
            .collect();

        AssembledResult {
            placements,
            statistics,
            roster,
            warnings,
        }
    }

    fn statistics(
        &self,
        total_members: usize,
        rooms: &[&Room],
        placements: &[Placement],
        solve_mode: SolveMode,
    ) -> SeatingStatistics {
        let room_stats: Vec<RoomStatistics> = rooms
            .iter()
            .map(|room| {
                let in_room = placements.iter().filter(|p| p.room_id == room.id);
                let (occupancy, overflow_count) =
                    in_room.fold((0, 0), |(occ, ovf), p| (occ + 1, ovf + usize::from(p.overflow)));
                RoomStatistics {
                    room_id: room.id,
                    room_name: room.name.clone(),
                    capacity: room.capacity,
                    occupancy,
                    overflow_count,
                    fill_ratio: fill_ratio(occupancy, room.capacity),
                }
            })
            .collect();

        let mut group_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for placement in placements {
            *group_distribution
                .entry(placement.group.as_str().to_string())
                .or_default() += 1;
        }

        SeatingStatistics {
            total_members,
            placed: placements.len(),
            rooms_used: room_stats.iter().filter(|r| r.occupancy > 0).count(),
            rooms_available: rooms.len(),
            overflow_placements: placements.iter().filter(|p| p.overflow).count(),
            solve_mode,
            rooms: room_stats,
            group_distribution,
        }
    }

    /// 名单: 每名已落位考生一行（1 起编号）
    pub fn roster(&self, placements: &[Placement]) -> Vec<String> {
        placements
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let index = (idx + 1).to_string();
                let seat = p.seat_display();
                let key = if p.overflow {
                    "roster.overflow_line"
                } else {
                    "roster.line"
                };
                i18n::t_with_args(
                    &self.locale,
                    key,
                    &[
                        ("index", index.as_str()),
                        ("room", p.room_name.as_str()),
                        ("seat", seat.as_str()),
                        ("name", p.member_name.as_str()),
                        ("group", p.group.as_str()),
                    ],
                )
            })
            .collect()
    }

    pub fn warning_message(&self, kind: &WarningKind) -> String {
        match kind {
            WarningKind::OverflowUsed {
                room_name, count, ..
            } => i18n::t_with_args(
                &self.locale,
                "warning.overflow_used",
                &[("room", room_name.as_str()), ("count", count.to_string().as_str())],
            ),
            WarningKind::PinnedNeighborConflict {
                room_name,
                seat_a,
                seat_b,
                conflict_key,
                ..
            } => i18n::t_with_args(
                &self.locale,
                "warning.pinned_neighbor_conflict",
                &[
                    ("room", room_name.as_str()),
                    ("seat_a", format!("{:03}", seat_a).as_str()),
                    ("seat_b", format!("{:03}", seat_b).as_str()),
                    ("key", conflict_key.as_str()),
                ],
            ),
        }
    }
}

/// occupancy / capacity 保留两位小数
fn fill_ratio(occupancy: usize, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    let percent = occupancy as f64 * 100.0 / f64::from(capacity);
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{GroupKey, MemberId, RoomId};

    fn placement(id: u64, room: (u64, &str), seat: u32, group: &str, overflow: bool) -> Placement {
        Placement {
            member_id: MemberId(id),
            member_name: format!("ID:{}", id),
            room_id: RoomId(room.0),
            room_name: room.1.to_string(),
            seat_number: seat,
            seat_label: None,
            group: GroupKey::from(group),
            pinned: false,
            overflow,
        }
    }

    #[test]
    fn test_fill_ratio() {
        assert_eq!(fill_ratio(1, 3), 33.33);
        assert_eq!(fill_ratio(2, 3), 66.67);
        assert_eq!(fill_ratio(4, 4), 100.0);
        assert_eq!(fill_ratio(1, 8), 12.5);
        assert_eq!(fill_ratio(3, 0), 0.0);
    }

    #[test]
    fn test_assemble_sorts_and_counts() {
        let rooms = [Room::new(1, "B-Block", 3), Room::new(2, "A-Block", 2), Room::new(3, "C", 5)];
        let room_refs: Vec<&Room> = rooms.iter().collect();

        let pinned = vec![placement(1, (1, "B-Block"), 3, "9-A", false)];
        let solved = vec![
            placement(2, (1, "B-Block"), 1, "9-B", false),
            placement(3, (2, "A-Block"), 2, "9-A", false),
            placement(4, (1, "B-Block"), 900_100, "9-A", true),
        ];

        let result = ResultAssembler::new("en").assemble(
            4,
            &room_refs,
            pinned,
            solved,
            SolveMode::Overflow,
            vec![WarningKind::OverflowUsed {
                room_id: RoomId(1),
                room_name: "B-Block".to_string(),
                count: 1,
            }],
        );

        let order: Vec<(String, u32)> = result
            .placements
            .iter()
            .map(|p| (p.room_name.clone(), p.seat_number))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A-Block".to_string(), 2),
                ("B-Block".to_string(), 1),
                ("B-Block".to_string(), 3),
                ("B-Block".to_string(), 900_100),
            ]
        );

        let stats = &result.statistics;
        assert_eq!(stats.placed, 4);
        assert_eq!(stats.rooms_used, 2);
        assert_eq!(stats.rooms_available, 3);
        assert_eq!(stats.overflow_placements, 1);
        assert_eq!(stats.rooms[0].occupancy, 3);
        assert_eq!(stats.rooms[0].overflow_count, 1);
        assert_eq!(stats.rooms[0].fill_ratio, 100.0);
        assert_eq!(stats.group_distribution.get("9-A"), Some(&3));

        assert_eq!(result.roster.len(), 4);
        assert!(result.roster[0].starts_with("1. A-Block seat 002"));
        assert!(result.roster[3].contains("overflow desk"));
        assert!(result.warnings[0].message.contains("B-Block"));
    }

    #[test]
    fn test_roster_default_locale() {
        let assembler = ResultAssembler::default();
        let mut p = placement(7, (1, "A-101"), 5, "10-A", false);
        p.seat_label = Some("Window".to_string());
        let roster = assembler.roster(&[p]);
        assert!(roster[0].starts_with("1. A-101"));
        assert!(roster[0].contains("005 - Window"));
        assert!(roster[0].contains("ID:7"));
    }
}
