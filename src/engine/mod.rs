// ==========================================
// 考场座位编排引擎 - 引擎层
// ==========================================
// 职责: 座位拓扑、固定落位、候选座位池、约束求解、结果汇总、编排
// 红线: 引擎无跨调用状态, 每次运行独立
// ==========================================

pub mod assembler;
pub mod assigner;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod outcome;
pub mod pinned;
pub mod seat_pool;
pub mod solver;
pub mod topology;

// 重导出核心引擎
pub use assembler::{AssembledResult, ResultAssembler};
pub use assigner::{AssignmentPlan, ConstraintAssigner};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, RecordingEventPublisher, SeatingEvent,
    SeatingEventPublisher,
};
pub use orchestrator::SeatingEngine;
pub use outcome::AssignmentOutcome;
pub use pinned::{PinnedLayout, PinnedPlacer};
pub use seat_pool::{overflow_desk_number, CandidateSeat, CandidateSeatPool, OVERFLOW_DESK_BASE};
pub use topology::{SeatLookup, SeatTopology};
