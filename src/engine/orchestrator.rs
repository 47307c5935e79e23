// ==========================================
// 考场座位编排引擎 - 引擎编排器
// ==========================================
// 用途: 校验输入, 依次驱动 固定落位 → 候选座位池 → 约束求解 → 结果汇总
// 状态机: Validating → PlacingPinned → BuildingPool → Solving → Assembling → Done
//         Validating / PlacingPinned / Solving 可进入 Failed
// 红线: 所有失败以 AssignmentOutcome 返回, 不 panic
// ==========================================

use crate::config::{ConfigResult, EngineConfig, EngineConfigReader};
use crate::domain::member::Member;
use crate::domain::request::SeatingRequest;
use crate::domain::room::Room;
use crate::domain::types::{EngineStage, RoomId, SolveMode};
use crate::engine::assembler::ResultAssembler;
use crate::engine::assigner::ConstraintAssigner;
use crate::engine::error::EngineError;
use crate::engine::events::{OptionalEventPublisher, SeatingEvent, SeatingEventPublisher};
use crate::engine::outcome::AssignmentOutcome;
use crate::engine::pinned::PinnedPlacer;
use crate::engine::topology::{validate_seat_map, SeatTopology};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// StageTracker - 单次运行的阶段跟踪
// ==========================================
struct StageTracker<'a> {
    run_id: Uuid,
    current: Option<EngineStage>,
    publisher: &'a OptionalEventPublisher,
}

impl<'a> StageTracker<'a> {
    fn new(run_id: Uuid, publisher: &'a OptionalEventPublisher) -> Self {
        Self {
            run_id,
            current: None,
            publisher,
        }
    }

    fn enter(&mut self, next: EngineStage) {
        if let Some(current) = self.current {
            debug_assert!(
                current.can_transition_to(next),
                "非法阶段迁移: {} → {}",
                current,
                next
            );
        }
        info!(run_id = %self.run_id, from = ?self.current, to = %next, "阶段迁移");
        self.publisher
            .publish(SeatingEvent::transition(self.run_id, self.current, next));
        self.current = Some(next);
    }

    fn fail(&mut self, errors: Vec<EngineError>) -> AssignmentOutcome {
        warn!(
            run_id = %self.run_id,
            stage = ?self.current,
            error_count = errors.len(),
            first_error = %errors.first().map(ToString::to_string).unwrap_or_default(),
            "编排失败"
        );
        let detail = errors
            .iter()
            .map(|e| e.kind().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.publisher.publish(
            SeatingEvent::transition(self.run_id, self.current, EngineStage::Failed)
                .with_detail(detail),
        );
        self.current = Some(EngineStage::Failed);
        AssignmentOutcome::failed(self.run_id, errors)
    }
}

// ==========================================
// SeatingEngine - 编排引擎
// ==========================================
#[derive(Debug)]
pub struct SeatingEngine {
    config: EngineConfig,
    placer: PinnedPlacer,
    assigner: ConstraintAssigner,
    assembler: ResultAssembler,
    publisher: OptionalEventPublisher,
}

impl SeatingEngine {
    /// 创建引擎实例
    ///
    /// # 参数
    /// - config: 配置快照
    pub fn new(config: EngineConfig) -> Self {
        Self {
            placer: PinnedPlacer::new(),
            assigner: ConstraintAssigner::from_config(&config),
            assembler: ResultAssembler::new(&config.locale),
            publisher: OptionalEventPublisher::none(),
            config,
        }
    }

    /// 从配置读取器创建
    pub fn from_reader<R>(reader: &R) -> ConfigResult<Self>
    where
        R: EngineConfigReader + ?Sized,
    {
        Ok(Self::new(EngineConfig::from_reader(reader)?))
    }

    /// 注入阶段事件发布者
    pub fn with_publisher(mut self, publisher: Arc<dyn SeatingEventPublisher>) -> Self {
        self.publisher = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 执行一次完整编排
    ///
    /// # 参数
    /// - request: 考生/考场/座位表快照
    ///
    /// # 返回
    /// 编排结果（成功或失败均以数据返回）
    #[instrument(skip_all, fields(
        members = request.members.len(),
        rooms = request.rooms.len()
    ))]
    pub fn run(&self, request: &SeatingRequest) -> AssignmentOutcome {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let mut stage = StageTracker::new(run_id, &self.publisher);

        info!(run_id = %run_id, "开始座位编排");

        // ==========================================
        // 阶段1: 输入校验
        // ==========================================
        stage.enter(EngineStage::Validating);
        let active_rooms = match validate(request) {
            Ok(rooms) => rooms,
            Err(errors) => return stage.fail(errors),
        };

        let room_order: Vec<RoomId> = active_rooms.iter().map(|r| r.id).collect();
        let topologies: HashMap<RoomId, SeatTopology> = active_rooms
            .iter()
            .map(|room| {
                (
                    room.id,
                    SeatTopology::build(room, request.seats_for(room.id), self.config.default_row_width),
                )
            })
            .collect();

        let (pinned, mut mobile): (Vec<&Member>, Vec<&Member>) =
            request.members.iter().partition(|m| m.is_pinned());

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        mobile.shuffle(&mut rng);

        debug!(
            pinned_count = pinned.len(),
            mobile_count = mobile.len(),
            seed,
            "考生划分完成"
        );

        // ==========================================
        // 阶段2: 固定考生落位
        // ==========================================
        stage.enter(EngineStage::PlacingPinned);
        let layout = match self.placer.place(&pinned, &topologies) {
            Ok(layout) => layout,
            Err(errors) => return stage.fail(errors),
        };

        let mut warnings = if self.config.forbid_same_group_adjacent {
            self.placer
                .neighbor_conflicts(&layout, &topologies, self.config.adjacency_scope)
        } else {
            Vec::new()
        };

        // ==========================================
        // 阶段3/4: 候选座位池 + 约束求解
        // ==========================================
        let (solve_mode, solved) = if mobile.is_empty() {
            debug!("无流动考生, 跳过求解");
            (SolveMode::PinnedOnly, Vec::new())
        } else {
            stage.enter(EngineStage::BuildingPool);
            let ordered: Vec<&SeatTopology> = room_order
                .iter()
                .filter_map(|id| topologies.get(id))
                .collect();

            stage.enter(EngineStage::Solving);
            match self.assigner.assign(&mobile, &ordered, &layout) {
                Ok(plan) => {
                    warnings.extend(plan.warnings);
                    (plan.solve_mode, plan.placements)
                }
                Err(error) => return stage.fail(vec![error]),
            }
        };

        // ==========================================
        // 阶段5: 结果汇总
        // ==========================================
        stage.enter(EngineStage::Assembling);
        let assembled = self.assembler.assemble(
            request.members.len(),
            &active_rooms,
            layout.placements,
            solved,
            solve_mode,
            warnings,
        );

        stage.enter(EngineStage::Done);
        info!(
            run_id = %run_id,
            solve_mode = %solve_mode,
            placed = assembled.placements.len(),
            overflow = assembled.statistics.overflow_placements,
            warnings = assembled.warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "座位编排完成"
        );

        AssignmentOutcome {
            run_id,
            success: true,
            solve_mode: Some(solve_mode),
            placements: assembled.placements,
            statistics: Some(assembled.statistics),
            errors: Vec::new(),
            warnings: assembled.warnings,
            roster: assembled.roster,
            finished_at: chrono::Utc::now(),
        }
    }
}

// ==========================================
// 输入校验
// ==========================================

/// 校验输入快照
///
/// # 返回
/// - Ok: 启用考场（输入顺序）
/// - Err: 汇总的全部输入错误
fn validate(request: &SeatingRequest) -> Result<Vec<&Room>, Vec<EngineError>> {
    let mut errors = Vec::new();

    if request.members.is_empty() {
        errors.push(EngineError::EmptyMembers);
    }

    let active_rooms: Vec<&Room> = request.rooms.iter().filter(|r| r.active).collect();
    if active_rooms.is_empty() {
        errors.push(EngineError::EmptyRooms);
    }

    let mut seen_members = HashSet::new();
    let mut reported_members = HashSet::new();
    for member in &request.members {
        if !seen_members.insert(member.id) && reported_members.insert(member.id) {
            errors.push(EngineError::DuplicateMember {
                member_id: member.id,
            });
        }
    }

    let mut seen_rooms = HashSet::new();
    let mut reported_rooms = HashSet::new();
    for room in &request.rooms {
        if !seen_rooms.insert(room.id) && reported_rooms.insert(room.id) {
            errors.push(EngineError::DuplicateRoom { room_id: room.id });
        }
    }

    let mut total_capacity: u64 = 0;
    for room in &active_rooms {
        if room.capacity == 0 {
            errors.push(EngineError::InvalidRoomCapacity {
                room_name: room.name.clone(),
                capacity: room.capacity,
            });
            continue;
        }
        total_capacity += match request.seats_for(room.id) {
            Some(seats) => {
                errors.extend(validate_seat_map(room, seats));
                seats.iter().filter(|s| s.active).count() as u64
            }
            None => u64::from(room.capacity),
        };
    }

    if !request.members.is_empty()
        && !active_rooms.is_empty()
        && (request.members.len() as u64) > total_capacity
    {
        errors.push(EngineError::InsufficientCapacity {
            members: request.members.len(),
            capacity: total_capacity,
        });
    }

    if errors.is_empty() {
        Ok(active_rooms)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::SeatRef;
    use crate::domain::room::Seat;
    use crate::engine::events::RecordingEventPublisher;
    use std::time::Duration;

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_seed(7)
            .with_workers(2)
            .with_time_limit(Duration::from_secs(10))
    }

    #[test]
    fn test_validate_aggregates_input_errors() {
        let request = SeatingRequest::new(
            vec![Member::mobile(1, "9-A"), Member::mobile(1, "9-A")],
            vec![Room::new(1, "A", 0), Room::new(1, "B", 4)],
        );
        let errors = validate(&request).unwrap_err();
        assert!(errors.contains(&EngineError::DuplicateMember {
            member_id: crate::domain::MemberId(1)
        }));
        assert!(errors.contains(&EngineError::DuplicateRoom { room_id: RoomId(1) }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, EngineError::InvalidRoomCapacity { .. })));
    }

    #[test]
    fn test_inactive_rooms_do_not_count() {
        let request = SeatingRequest::new(
            vec![Member::mobile(1, "9-A")],
            vec![Room::new(1, "A", 4).inactive()],
        );
        assert_eq!(validate(&request).unwrap_err(), vec![EngineError::EmptyRooms]);
    }

    #[test]
    fn test_explicit_seat_map_limits_capacity() {
        let request = SeatingRequest::new(
            vec![Member::mobile(1, "9-A"), Member::mobile(2, "9-B")],
            vec![Room::new(1, "A", 2)],
        )
        .with_seat_map(RoomId(1), vec![Seat::new(1), Seat::new(2).inactive()]);
        assert_eq!(
            validate(&request).unwrap_err(),
            vec![EngineError::InsufficientCapacity {
                members: 2,
                capacity: 1
            }]
        );
    }

    #[test]
    fn test_pinned_only_run_skips_solver() {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let engine = SeatingEngine::new(config()).with_publisher(recorder.clone());
        let request = SeatingRequest::new(
            vec![Member::pinned(1, "9-A", 1, SeatRef::Number(2))],
            vec![Room::new(1, "A", 4)],
        );

        let outcome = engine.run(&request);
        assert!(outcome.success);
        assert_eq!(outcome.solve_mode, Some(SolveMode::PinnedOnly));
        assert_eq!(
            recorder.stages(),
            vec![
                EngineStage::Validating,
                EngineStage::PlacingPinned,
                EngineStage::Assembling,
                EngineStage::Done
            ]
        );
    }

    #[test]
    fn test_failure_stops_at_validating() {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let engine = SeatingEngine::new(config()).with_publisher(recorder.clone());
        let outcome = engine.run(&SeatingRequest::new(Vec::new(), vec![Room::new(1, "A", 2)]));

        assert!(!outcome.success);
        assert_eq!(outcome.errors, vec![EngineError::EmptyMembers]);
        assert!(outcome.placements.is_empty());
        assert_eq!(recorder.stages(), vec![EngineStage::Validating, EngineStage::Failed]);
    }
}
