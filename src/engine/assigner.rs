// ==========================================
// 考场座位编排引擎 - 约束分配器（两阶段）
// ==========================================
// 第一阶段 STRICT: 只用真实座位
//   - 流动考生多于空闲真实座位时直接跳过
//   - 无解或超时未找到解 → 进入第二阶段
// 第二阶段 OVERFLOW: 每个考场追加一个讲台备用座, 最小化其使用数
//   - 仍无解 → NoFeasibleSeating（不可重试）
// ==========================================

use crate::config::EngineConfig;
use crate::domain::member::Member;
use crate::domain::placement::{Placement, WarningKind};
use crate::domain::types::{RoomId, SolveMode};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::pinned::PinnedLayout;
use crate::engine::seat_pool::CandidateSeatPool;
use crate::engine::solver::{
    AdjacencyRules, AssignmentModel, PortfolioSolver, SolverOptions, SolverResult,
};
use crate::engine::topology::SeatTopology;
use tracing::{debug, info, instrument, warn};

/// 流动考生的分配结果
#[derive(Debug, Clone)]
pub struct AssignmentPlan {
    pub solve_mode: SolveMode,
    pub placements: Vec<Placement>,
    /// 第二阶段各考场讲台备用座使用提示
    pub warnings: Vec<WarningKind>,
}

// ==========================================
// ConstraintAssigner - 约束分配器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConstraintAssigner {
    rules: AdjacencyRules,
    options: SolverOptions,
}

impl ConstraintAssigner {
    pub fn new(rules: AdjacencyRules, options: SolverOptions) -> Self {
        Self { rules, options }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            AdjacencyRules {
                scope: config.adjacency_scope,
                forbid_same_group_adjacent: config.forbid_same_group_adjacent,
                avoid_pinned_neighbors: config.avoid_pinned_neighbors,
            },
            SolverOptions {
                workers: config.search_workers,
                time_limit: config.solve_time_limit(),
            },
        )
    }

    /// 为流动考生分配座位
    ///
    /// # 参数
    /// - mobile: 流动考生（已洗牌）
    /// - topologies: 启用考场拓扑（考场输入顺序）
    /// - layout: 固定考生落位结果
    ///
    /// # 返回
    /// - Ok(AssignmentPlan): 第一或第二阶段的分配
    /// - Err(NoFeasibleSeating): 两阶段均无解
    /// - Err(SolverBackend): 求解线程故障
    #[instrument(skip_all, fields(mobile_count = mobile.len(), rooms = topologies.len()))]
    pub fn assign(
        &self,
        mobile: &[&Member],
        topologies: &[&SeatTopology],
        layout: &PinnedLayout,
    ) -> EngineResult<AssignmentPlan> {
        let solver = PortfolioSolver::new(self.options);

        // ===== 第一阶段 =====
        let strict_pool = CandidateSeatPool::build(topologies.iter().copied(), layout, false);
        if mobile.len() > strict_pool.real_seat_count() {
            info!(
                mobile_count = mobile.len(),
                free_seats = strict_pool.real_seat_count(),
                "空闲真实座位不足, 跳过第一阶段"
            );
        } else {
            let model = AssignmentModel::build(mobile, &strict_pool, self.rules);
            let outcome = solver.solve(&model)?;
            match outcome.result.into_labeling() {
                Some(labeling) => {
                    info!("第一阶段求解成功");
                    let seats = model.bind(&labeling);
                    return Ok(AssignmentPlan {
                        solve_mode: SolveMode::Strict,
                        placements: to_placements(mobile, &seats, &strict_pool),
                        warnings: Vec::new(),
                    });
                }
                None => info!(reason = %outcome.reason, "第一阶段无解, 启用讲台备用座"),
            }
        }

        // ===== 第二阶段 =====
        let overflow_pool = CandidateSeatPool::build(topologies.iter().copied(), layout, true);
        let model = AssignmentModel::build(mobile, &overflow_pool, self.rules);
        let outcome = solver.solve(&model)?;

        if matches!(outcome.result, SolverResult::Feasible(_)) {
            warn!("第二阶段超时, 使用当前最优解（未证明最优）");
        }

        let Some(labeling) = outcome.result.into_labeling() else {
            warn!(reason = %outcome.reason, "第二阶段无解");
            return Err(EngineError::NoFeasibleSeating);
        };

        let seats = model.bind(&labeling);
        let placements = to_placements(mobile, &seats, &overflow_pool);
        let warnings = overflow_warnings(&placements, topologies);

        info!(overflow = labeling.overflow, "第二阶段求解成功");

        Ok(AssignmentPlan {
            solve_mode: SolveMode::Overflow,
            placements,
            warnings,
        })
    }
}

fn to_placements(mobile: &[&Member], seats: &[usize], pool: &CandidateSeatPool) -> Vec<Placement> {
    mobile
        .iter()
        .zip(seats)
        .map(|(member, &idx)| {
            let seat = pool.seat(idx);
            debug!(
                member_id = %member.id,
                room = %seat.room_name,
                seat_number = seat.seat_number,
                overflow = seat.overflow,
                "流动考生落位"
            );
            Placement {
                member_id: member.id,
                member_name: member.display_name(),
                room_id: seat.room_id,
                room_name: seat.room_name.clone(),
                seat_number: seat.seat_number,
                seat_label: seat.seat_label.clone(),
                group: member.group.clone(),
                pinned: false,
                overflow: seat.overflow,
            }
        })
        .collect()
}

/// 每个使用了讲台备用座的考场一条提示（考场输入顺序）
fn overflow_warnings(placements: &[Placement], topologies: &[&SeatTopology]) -> Vec<WarningKind> {
    topologies
        .iter()
        .filter_map(|topology| {
            let room_id: RoomId = topology.room_id();
            let count = placements
                .iter()
                .filter(|p| p.overflow && p.room_id == room_id)
                .count();
            (count > 0).then(|| WarningKind::OverflowUsed {
                room_id,
                room_name: topology.room_name().to_string(),
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::Room;
    use std::time::Duration;

    fn assigner() -> ConstraintAssigner {
        ConstraintAssigner::new(
            AdjacencyRules::default(),
            SolverOptions {
                workers: 2,
                time_limit: Duration::from_secs(10),
            },
        )
    }

    #[test]
    fn test_strict_phase() {
        let rooms = [Room::new(1, "A-1", 2), Room::new(2, "A-2", 2)];
        let topos: Vec<SeatTopology> = rooms.iter().map(|r| SeatTopology::build(r, None, 2)).collect();
        let topo_refs: Vec<&SeatTopology> = topos.iter().collect();
        let members = [
            Member::mobile(1, "5-A"),
            Member::mobile(2, "5-A"),
            Member::mobile(3, "5-B"),
            Member::mobile(4, "5-B"),
        ];
        let refs: Vec<&Member> = members.iter().collect();

        let plan = assigner().assign(&refs, &topo_refs, &PinnedLayout::default()).unwrap();
        assert_eq!(plan.solve_mode, SolveMode::Strict);
        assert_eq!(plan.placements.len(), 4);
        assert!(plan.warnings.is_empty());
        assert!(plan.placements.iter().all(|p| !p.overflow && !p.pinned));
    }

    #[test]
    fn test_falls_back_to_overflow() {
        let rooms = [Room::new(1, "A-1", 3)];
        let topos: Vec<SeatTopology> = rooms.iter().map(|r| SeatTopology::build(r, None, 2)).collect();
        let topo_refs: Vec<&SeatTopology> = topos.iter().collect();
        let members = [
            Member::mobile(1, "6-A"),
            Member::mobile(2, "6-A"),
            Member::mobile(3, "6-A"),
        ];
        let refs: Vec<&Member> = members.iter().collect();

        let plan = assigner().assign(&refs, &topo_refs, &PinnedLayout::default()).unwrap();
        assert_eq!(plan.solve_mode, SolveMode::Overflow);
        assert_eq!(plan.placements.iter().filter(|p| p.overflow).count(), 1);
        assert_eq!(
            plan.warnings,
            vec![WarningKind::OverflowUsed {
                room_id: RoomId(1),
                room_name: "A-1".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_no_feasible_seating() {
        // 单座考场 + 一个讲台, 三名考生
        let rooms = [Room::new(1, "A-1", 1)];
        let topos: Vec<SeatTopology> = rooms.iter().map(|r| SeatTopology::build(r, None, 2)).collect();
        let topo_refs: Vec<&SeatTopology> = topos.iter().collect();
        let members = [
            Member::mobile(1, "6-A"),
            Member::mobile(2, "6-B"),
            Member::mobile(3, "6-C"),
        ];
        let refs: Vec<&Member> = members.iter().collect();

        let err = assigner()
            .assign(&refs, &topo_refs, &PinnedLayout::default())
            .unwrap_err();
        assert_eq!(err, EngineError::NoFeasibleSeating);
    }
}
