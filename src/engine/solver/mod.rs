// ==========================================
// 考场座位编排引擎 - 约束求解器
// ==========================================
// 职责: 带相邻禁止约束的座位分配（可选讲台备用座, 最小化其使用）
// 方法: 座位冲突键标注 + 深度优先分支定界 + 多线程子树划分
// ==========================================

pub mod incumbent;
pub mod model;
pub mod portfolio;
pub mod result;
pub mod search;

pub use model::{AdjacencyRules, AssignmentModel};
pub use portfolio::{PortfolioSolver, SolverOptions};
pub use result::{Labeling, SolverOutcome, SolverResult, SolverStatistics, TerminationReason};
