// ==========================================
// 考场座位编排引擎 - 领域模型层
// ==========================================
// 职责: 定义考生、考场、座位、落位结果等实体
// 红线: 不含引擎逻辑
// ==========================================

pub mod member;
pub mod placement;
pub mod request;
pub mod room;
pub mod types;

// 重导出核心类型
pub use member::{Member, PinTarget, SeatRef};
pub use placement::{Placement, RoomStatistics, SeatingStatistics, SeatingWarning, WarningKind};
pub use request::SeatingRequest;
pub use room::{Room, Seat};
pub use types::{AdjacencyScope, EngineStage, GroupKey, MemberId, RoomId, SeatId, SolveMode};
