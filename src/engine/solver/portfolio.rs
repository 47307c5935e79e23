// ==========================================
// 并行求解（根节点子树划分）
// ==========================================
// 1. 按深度优先顺序展开根节点, 得到有序子树列表
// 2. 工作线程按序号领取子树（原子计数器）
// 3. 共享最优解按 (目标值, 子树序号) 字典序剪枝
// 结果等同单线程深度优先搜索的结果, 与线程数无关
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::solver::incumbent::SharedIncumbent;
use crate::engine::solver::model::AssignmentModel;
use crate::engine::solver::result::{
    Labeling, SolverOutcome, SolverResult, SolverStatistics, TerminationReason,
};
use crate::engine::solver::search::{SearchState, SubtreeSearch};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// 每个工作线程期望分到的子树数
const SUBTREES_PER_WORKER: usize = 4;

/// 根节点展开的最大深度
const MAX_FRONTIER_DEPTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    pub workers: usize,
    pub time_limit: Duration,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            time_limit: Duration::from_secs(15),
        }
    }
}

/// 单个工作线程的汇报
#[derive(Debug, Clone, Copy, Default)]
struct WorkerReport {
    nodes: u64,
    timed_out: bool,
}

// ==========================================
// PortfolioSolver - 并行分支定界求解器
// ==========================================
#[derive(Debug, Default)]
pub struct PortfolioSolver {
    options: SolverOptions,
}

impl PortfolioSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// 求解座位标注
    ///
    /// # 返回
    /// - Ok(SolverOutcome): Optimal / Feasible / Infeasible / Unknown
    /// - Err(EngineError::SolverBackend): 工作线程无法创建或异常退出
    #[instrument(skip_all, fields(
        members = model.total_demand(),
        real_seats = model.real_seats(),
        overflow_seats = model.overflow_capacity(),
        keys = model.key_count()
    ))]
    pub fn solve(&self, model: &AssignmentModel) -> EngineResult<SolverOutcome> {
        let start = Instant::now();
        let deadline = start + self.options.time_limit;

        let mut root = SearchState::new(model);
        let root_bound = root.lower_bound();
        if root_bound > model.overflow_capacity() {
            debug!(root_bound, "根节点下界超过讲台备用座数量, 无解");
            return Ok(self.outcome(
                SolverResult::Infeasible,
                TerminationReason::InfeasibilityProven,
                SolverStatistics {
                    elapsed: start.elapsed(),
                    ..Default::default()
                },
            ));
        }

        let workers = self.options.workers.max(1);
        let frontier = build_frontier(&mut root, workers * SUBTREES_PER_WORKER, model.overflow_capacity());
        if frontier.is_empty() {
            return Ok(self.outcome(
                SolverResult::Infeasible,
                TerminationReason::InfeasibilityProven,
                SolverStatistics {
                    elapsed: start.elapsed(),
                    ..Default::default()
                },
            ));
        }

        let workers = workers.min(frontier.len());
        debug!(subtrees = frontier.len(), workers, root_bound, "子树划分完成");

        let incumbent = SharedIncumbent::new();
        let stop = AtomicBool::new(false);
        let next_subtree = AtomicUsize::new(0);

        let reports = run_workers(
            model,
            &frontier,
            workers,
            deadline,
            &incumbent,
            &stop,
            &next_subtree,
        )?;

        let statistics = SolverStatistics {
            nodes: reports.iter().map(|r| r.nodes).sum(),
            subtrees: frontier.len(),
            workers,
            elapsed: start.elapsed(),
        };
        let timed_out = reports.iter().any(|r| r.timed_out);

        let outcome = match incumbent.snapshot() {
            Some(best) => {
                let labeling = Labeling {
                    labels: best.labels,
                    overflow: best.objective,
                };
                if !timed_out || best.objective == root_bound {
                    self.outcome(
                        SolverResult::Optimal(labeling),
                        TerminationReason::OptimalityProven,
                        statistics,
                    )
                } else {
                    self.outcome(
                        SolverResult::Feasible(labeling),
                        TerminationReason::TimeLimit,
                        statistics,
                    )
                }
            }
            None if timed_out => self.outcome(
                SolverResult::Unknown,
                TerminationReason::TimeLimit,
                statistics,
            ),
            None => self.outcome(
                SolverResult::Infeasible,
                TerminationReason::InfeasibilityProven,
                statistics,
            ),
        };

        info!(
            result = %outcome.result,
            reason = %outcome.reason,
            nodes = outcome.statistics.nodes,
            elapsed_ms = outcome.statistics.elapsed.as_millis() as u64,
            "求解结束"
        );

        Ok(outcome)
    }

    fn outcome(
        &self,
        result: SolverResult,
        reason: TerminationReason,
        statistics: SolverStatistics,
    ) -> SolverOutcome {
        SolverOutcome {
            result,
            reason,
            statistics,
        }
    }
}

/// 按深度优先顺序逐层展开根节点, 直到子树数达到 target
///
/// 下界超过讲台备用座数量的子节点直接丢弃; 已完成的节点原样保留
fn build_frontier(
    state: &mut SearchState<'_>,
    target: usize,
    overflow_capacity: usize,
) -> Vec<Vec<Option<usize>>> {
    let mut frontier: Vec<Vec<Option<usize>>> = vec![Vec::new()];

    for _ in 0..MAX_FRONTIER_DEPTH {
        if frontier.len() >= target {
            break;
        }

        let mut expanded = Vec::with_capacity(frontier.len() * 2);
        let mut grew = false;

        for prefix in frontier {
            state.replay(&prefix);
            if state.is_complete() {
                expanded.push(prefix);
                continue;
            }

            grew = true;
            for choice in state.candidates() {
                state.apply(choice);
                if state.lower_bound() <= overflow_capacity {
                    let mut child = prefix.clone();
                    child.push(choice);
                    expanded.push(child);
                }
                state.undo();
            }
        }

        frontier = expanded;
        if !grew || frontier.is_empty() {
            break;
        }
    }

    state.rewind();
    frontier
}

fn run_workers(
    model: &AssignmentModel,
    frontier: &[Vec<Option<usize>>],
    workers: usize,
    deadline: Instant,
    incumbent: &SharedIncumbent,
    stop: &AtomicBool,
    next_subtree: &AtomicUsize,
) -> EngineResult<Vec<WorkerReport>> {
    let work = move || {
        let mut state = SearchState::new(model);
        let mut search = SubtreeSearch::new(incumbent, stop, deadline, model.overflow_capacity());

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let subtree = next_subtree.fetch_add(1, Ordering::Relaxed);
            let Some(prefix) = frontier.get(subtree) else {
                break;
            };
            state.replay(prefix);
            if !search.explore(&mut state, subtree) {
                break;
            }
        }

        WorkerReport {
            nodes: search.nodes(),
            timed_out: search.timed_out(),
        }
    };

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut spawn_error = None;

        for idx in 0..workers {
            let spawned = std::thread::Builder::new()
                .name(format!("seat-search-{}", idx))
                .spawn_scoped(scope, work);
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    warn!(worker = idx, error = %e, "求解线程创建失败");
                    stop.store(true, Ordering::Relaxed);
                    spawn_error = Some(EngineError::SolverBackend(format!(
                        "无法创建求解线程: {}",
                        e
                    )));
                    break;
                }
            }
        }

        let mut reports = Vec::with_capacity(handles.len());
        let mut panicked = false;
        for handle in handles {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => panicked = true,
            }
        }

        if let Some(err) = spawn_error {
            return Err(err);
        }
        if panicked {
            return Err(EngineError::SolverBackend("求解线程异常退出".to_string()));
        }
        Ok(reports)
    })
}
