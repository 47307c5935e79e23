// ==========================================
// 求解结果
// ==========================================

use std::fmt;
use std::time::Duration;

/// 座位标注方案: 每个候选真实座位的冲突键下标（None = 空座）
/// 以及落到讲台备用座的人数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeling {
    pub labels: Vec<Option<usize>>,
    pub overflow: usize,
}

impl Labeling {
    pub fn objective(&self) -> usize {
        self.overflow
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult {
    /// 已证明无解
    Infeasible,
    /// 找到解并证明最优
    Optimal(Labeling),
    /// 找到解但未证明最优（时间耗尽）
    Feasible(Labeling),
    /// 时间耗尽且未找到解
    Unknown,
}

impl SolverResult {
    pub fn labeling(&self) -> Option<&Labeling> {
        match self {
            SolverResult::Optimal(l) | SolverResult::Feasible(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_labeling(self) -> Option<Labeling> {
        match self {
            SolverResult::Optimal(l) | SolverResult::Feasible(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(l) => write!(f, "Optimal(overflow={})", l.overflow),
            SolverResult::Feasible(l) => write!(f, "Feasible(overflow={})", l.overflow),
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    OptimalityProven,
    InfeasibilityProven,
    TimeLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "OPTIMALITY_PROVEN"),
            TerminationReason::InfeasibilityProven => write!(f, "INFEASIBILITY_PROVEN"),
            TerminationReason::TimeLimit => write!(f, "TIME_LIMIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverStatistics {
    pub nodes: u64,
    pub subtrees: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome {
    pub result: SolverResult,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}
