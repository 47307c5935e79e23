// ==========================================
// 深度优先分支定界
// ==========================================
// 变量顺序: 真实座位按 (考场, 座位号) 顺序
// 取值顺序: 剩余需求多的冲突键优先, 同需求按首次出现顺序, 最后尝试空座
// 前向检查: blocked[键][座位] 计数 + 每键每考场剩余可用座位数
// 键可达座位 = Σ 考场 min(可用座位, 考场上限 - 已占)
// 下界: max(剩余需求 - 剩余真实座位, Σ max(0, 键需求 - 键可达座位))
// ==========================================

use crate::engine::solver::incumbent::SharedIncumbent;
use crate::engine::solver::model::AssignmentModel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// 每隔多少节点检查一次时间
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// 搜索状态（单线程独占）
#[derive(Debug, Clone)]
pub struct SearchState<'m> {
    model: &'m AssignmentModel,
    remaining: Vec<usize>,
    total_remaining: usize,
    blocked: Vec<Vec<u32>>,
    /// [键][考场] 未决策且未被屏蔽的座位数
    open: Vec<Vec<usize>>,
    /// [键][考场] 已标注的座位数
    placed: Vec<Vec<usize>>,
    labels: Vec<Option<usize>>,
    depth: usize,
}

impl<'m> SearchState<'m> {
    pub fn new(model: &'m AssignmentModel) -> Self {
        let keys = model.key_count();
        let seats = model.real_seats();

        let mut blocked = vec![vec![0u32; seats]; keys];
        for seat in 0..seats {
            for &key in model.forbidden(seat) {
                blocked[key][seat] += 1;
            }
        }
        let rooms = model.room_count();
        let mut open = vec![vec![0usize; rooms]; keys];
        for (key, row) in blocked.iter().enumerate() {
            for (seat, &count) in row.iter().enumerate() {
                if count == 0 {
                    open[key][model.seat_room(seat)] += 1;
                }
            }
        }

        Self {
            model,
            remaining: model.demand().to_vec(),
            total_remaining: model.total_demand(),
            blocked,
            open,
            placed: vec![vec![0usize; rooms]; keys],
            labels: vec![None; seats],
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }

    pub fn total_remaining(&self) -> usize {
        self.total_remaining
    }

    /// 所有真实座位均已决策, 或已无剩余需求
    pub fn is_complete(&self) -> bool {
        self.depth == self.model.real_seats() || self.total_remaining == 0
    }

    /// 讲台备用座人数下界
    pub fn lower_bound(&self) -> usize {
        let seats_left = self.model.real_seats() - self.depth;
        let by_supply = self.total_remaining.saturating_sub(seats_left);
        let caps = self.model.room_caps();
        let by_key: usize = self
            .remaining
            .iter()
            .enumerate()
            .map(|(key, &need)| {
                let reachable: usize = self.open[key]
                    .iter()
                    .zip(&self.placed[key])
                    .zip(caps)
                    .map(|((&open, &placed), &cap)| open.min(cap.saturating_sub(placed)))
                    .sum();
                need.saturating_sub(reachable)
            })
            .sum();
        by_supply.max(by_key)
    }

    /// 当前座位的候选取值
    pub fn candidates(&self) -> Vec<Option<usize>> {
        let seat = self.depth;
        let mut keys: Vec<usize> = (0..self.remaining.len())
            .filter(|&key| self.remaining[key] > 0 && self.blocked[key][seat] == 0)
            .collect();
        keys.sort_by(|&a, &b| self.remaining[b].cmp(&self.remaining[a]).then(a.cmp(&b)));

        let mut values: Vec<Option<usize>> = keys.into_iter().map(Some).collect();
        values.push(None);
        values
    }

    /// 对当前座位做出决策并前进
    pub fn apply(&mut self, choice: Option<usize>) {
        let seat = self.depth;
        let room = self.model.seat_room(seat);

        for key in 0..self.open.len() {
            if self.blocked[key][seat] == 0 {
                self.open[key][room] -= 1;
            }
        }

        if let Some(key) = choice {
            self.remaining[key] -= 1;
            self.total_remaining -= 1;
            self.placed[key][room] += 1;
            for &other in self.model.neighbors(seat) {
                if other > seat {
                    if self.blocked[key][other] == 0 {
                        self.open[key][self.model.seat_room(other)] -= 1;
                    }
                    self.blocked[key][other] += 1;
                }
            }
        }

        self.labels[seat] = choice;
        self.depth += 1;
    }

    /// 撤销最近一次决策
    pub fn undo(&mut self) {
        self.depth -= 1;
        let seat = self.depth;
        let room = self.model.seat_room(seat);

        if let Some(key) = self.labels[seat].take() {
            for &other in self.model.neighbors(seat) {
                if other > seat {
                    self.blocked[key][other] -= 1;
                    if self.blocked[key][other] == 0 {
                        self.open[key][self.model.seat_room(other)] += 1;
                    }
                }
            }
            self.placed[key][room] -= 1;
            self.remaining[key] += 1;
            self.total_remaining += 1;
        }

        for key in 0..self.open.len() {
            if self.blocked[key][seat] == 0 {
                self.open[key][room] += 1;
            }
        }
    }

    /// 回到根节点
    pub fn rewind(&mut self) {
        while self.depth > 0 {
            self.undo();
        }
    }

    /// 回到根节点后重放前缀决策
    pub fn replay(&mut self, prefix: &[Option<usize>]) {
        self.rewind();
        for &choice in prefix {
            self.apply(choice);
        }
    }
}

/// 节点处理结果
enum Visit {
    Pruned,
    Leaf,
    Branch(Vec<Option<usize>>),
}

struct Frame {
    options: Vec<Option<usize>>,
    next: usize,
}

/// 单个工作线程的搜索器
pub struct SubtreeSearch<'a> {
    incumbent: &'a SharedIncumbent,
    stop: &'a AtomicBool,
    deadline: Instant,
    overflow_capacity: usize,
    nodes: u64,
    timed_out: bool,
}

impl<'a> SubtreeSearch<'a> {
    pub fn new(
        incumbent: &'a SharedIncumbent,
        stop: &'a AtomicBool,
        deadline: Instant,
        overflow_capacity: usize,
    ) -> Self {
        Self {
            incumbent,
            stop,
            deadline,
            overflow_capacity,
            nodes: 0,
            timed_out: false,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    fn should_stop(&mut self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
            self.timed_out = true;
            self.stop.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    fn visit(&mut self, state: &SearchState<'_>, subtree: usize) -> Visit {
        self.nodes += 1;

        let lower_bound = state.lower_bound();
        if lower_bound > self.overflow_capacity || self.incumbent.dominates(lower_bound, subtree) {
            return Visit::Pruned;
        }

        if state.is_complete() {
            // 完成时下界即剩余需求（全部进讲台备用座）
            self.incumbent
                .try_install(state.total_remaining(), subtree, state.labels());
            return Visit::Leaf;
        }

        Visit::Branch(state.candidates())
    }

    /// 搜索以 state 当前节点为根的子树
    ///
    /// # 返回
    /// - true: 子树搜索完毕
    /// - false: 因停止信号或超时中断
    pub fn explore(&mut self, state: &mut SearchState<'_>, subtree: usize) -> bool {
        let mut stack = match self.visit(state, subtree) {
            Visit::Pruned | Visit::Leaf => return true,
            Visit::Branch(options) => vec![Frame { options, next: 0 }],
        };

        while let Some(frame) = stack.last_mut() {
            if self.should_stop() {
                return false;
            }

            if frame.next >= frame.options.len() {
                stack.pop();
                if !stack.is_empty() {
                    state.undo();
                }
                continue;
            }

            let choice = frame.options[frame.next];
            frame.next += 1;

            state.apply(choice);
            match self.visit(state, subtree) {
                Visit::Pruned | Visit::Leaf => state.undo(),
                Visit::Branch(options) => stack.push(Frame { options, next: 0 }),
            }
        }

        true
    }
}
