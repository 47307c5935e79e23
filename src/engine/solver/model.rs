// ==========================================
// 分配模型
// ==========================================
// 原始模型: 考生 × 候选座位 的 0/1 矩阵
//   - 每名考生恰好一个座位
//   - 每个座位至多一人
//   - 相邻空闲座位对上, 同一冲突键至多占一个
//   - 第二阶段: 最小化讲台备用座使用数
// 同一冲突键的考生在全部约束中可互换,
// 因此改为给座位标注冲突键（带需求配额）, 求解后再按洗牌顺序绑定考生
// ==========================================
// 考场上限: 同一冲突键在一个考场内的座位互不相邻, 构成独立集,
// 因此每键每考场至多占 最大独立集 个座位
// 座位网格按 (排 + 列) 奇偶二染色, 最大独立集 = 顶点数 - 最大匹配 (König)
// ==========================================

use crate::domain::member::Member;
use crate::domain::types::AdjacencyScope;
use crate::engine::seat_pool::CandidateSeatPool;
use crate::engine::solver::result::Labeling;
use std::collections::{HashMap, VecDeque};

/// 相邻规则开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyRules {
    pub scope: AdjacencyScope,
    pub forbid_same_group_adjacent: bool,
    pub avoid_pinned_neighbors: bool,
}

impl Default for AdjacencyRules {
    fn default() -> Self {
        Self {
            scope: AdjacencyScope::Group,
            forbid_same_group_adjacent: true,
            avoid_pinned_neighbors: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignmentModel {
    /// 冲突键（按洗牌后考生顺序的首次出现排序）
    keys: Vec<String>,
    demand: Vec<usize>,
    /// 考生 → 冲突键下标（洗牌后顺序）
    member_keys: Vec<usize>,
    real_seats: usize,
    overflow_seats: usize,
    /// 真实座位 → 相邻真实座位
    neighbors: Vec<Vec<usize>>,
    /// 真实座位 → 初始禁用的冲突键（相邻固定考生）
    forbidden: Vec<Vec<usize>>,
    /// 真实座位 → 考场下标（候选座位池中的考场顺序）
    seat_room: Vec<usize>,
    /// 考场下标 → 同一冲突键可占座位数上限
    room_caps: Vec<usize>,
}

impl AssignmentModel {
    /// 构建模型
    ///
    /// # 参数
    /// - members: 流动考生（已洗牌）
    /// - pool: 候选座位池
    /// - rules: 相邻规则
    pub fn build(members: &[&Member], pool: &CandidateSeatPool, rules: AdjacencyRules) -> Self {
        let mut keys: Vec<String> = Vec::new();
        let mut key_index: HashMap<String, usize> = HashMap::new();
        let mut demand = Vec::new();
        let mut member_keys = Vec::with_capacity(members.len());

        for member in members {
            let key = rules.scope.conflict_key(&member.group);
            let idx = match key_index.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = keys.len();
                    key_index.insert(key.clone(), idx);
                    keys.push(key);
                    demand.push(0);
                    idx
                }
            };
            demand[idx] += 1;
            member_keys.push(idx);
        }

        let real_seats = pool.real_seat_count();
        let neighbors: Vec<Vec<usize>> = (0..real_seats)
            .map(|seat| {
                if rules.forbid_same_group_adjacent {
                    pool.neighbors(seat).to_vec()
                } else {
                    Vec::new()
                }
            })
            .collect();

        let forbidden = (0..real_seats)
            .map(|seat| {
                if !(rules.forbid_same_group_adjacent && rules.avoid_pinned_neighbors) {
                    return Vec::new();
                }
                let mut list: Vec<usize> = pool
                    .pinned_neighbors(seat)
                    .iter()
                    .filter_map(|group| key_index.get(&rules.scope.conflict_key(group)).copied())
                    .collect();
                list.sort_unstable();
                list.dedup();
                list
            })
            .collect();

        let mut room_index = HashMap::new();
        let seat_room: Vec<usize> = (0..real_seats)
            .map(|seat| {
                let next = room_index.len();
                *room_index.entry(pool.seat(seat).room_id).or_insert(next)
            })
            .collect();

        let mut room_seats = vec![Vec::new(); room_index.len()];
        for (seat, &room) in seat_room.iter().enumerate() {
            room_seats[room].push(seat);
        }
        let room_caps = room_seats
            .iter()
            .map(|seats| independent_set_bound(seats, &neighbors))
            .collect();

        Self {
            keys,
            demand,
            member_keys,
            real_seats,
            overflow_seats: pool.overflow_seat_count(),
            neighbors,
            forbidden,
            seat_room,
            room_caps,
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn key(&self, idx: usize) -> &str {
        &self.keys[idx]
    }

    pub fn demand(&self) -> &[usize] {
        &self.demand
    }

    pub fn total_demand(&self) -> usize {
        self.member_keys.len()
    }

    pub fn real_seats(&self) -> usize {
        self.real_seats
    }

    /// 讲台备用座数量 = 目标值上限
    pub fn overflow_capacity(&self) -> usize {
        self.overflow_seats
    }

    pub fn neighbors(&self, seat: usize) -> &[usize] {
        &self.neighbors[seat]
    }

    pub fn forbidden(&self, seat: usize) -> &[usize] {
        &self.forbidden[seat]
    }

    pub fn room_count(&self) -> usize {
        self.room_caps.len()
    }

    pub fn seat_room(&self, seat: usize) -> usize {
        self.seat_room[seat]
    }

    /// 考场下标 → 同一冲突键最多可占的座位数
    pub fn room_caps(&self) -> &[usize] {
        &self.room_caps
    }

    /// 把座位标注绑定回考生
    ///
    /// # 返回
    /// 每名考生（洗牌后顺序）的候选座位下标;
    /// 标注为某冲突键的座位按座位顺序依次分给该键的考生, 剩余考生依次坐讲台备用座
    pub fn bind(&self, labeling: &Labeling) -> Vec<usize> {
        let mut seats_by_key: Vec<std::collections::VecDeque<usize>> =
            vec![Default::default(); self.keys.len()];
        for (seat, label) in labeling.labels.iter().enumerate() {
            if let Some(key) = label {
                seats_by_key[*key].push_back(seat);
            }
        }

        let mut next_desk = self.real_seats;
        self.member_keys
            .iter()
            .map(|&key| match seats_by_key[key].pop_front() {
                Some(seat) => seat,
                None => {
                    let desk = next_desk;
                    next_desk += 1;
                    desk
                }
            })
            .collect()
    }
}

/// 座位子图的最大独立集大小
///
/// 二分图时为 顶点数 - 最大匹配; 出现奇环时退化为顶点数
fn independent_set_bound(seats: &[usize], neighbors: &[Vec<usize>]) -> usize {
    let local: HashMap<usize, usize> = seats.iter().enumerate().map(|(i, &s)| (s, i)).collect();
    let adjacency: Vec<Vec<usize>> = seats
        .iter()
        .map(|&seat| {
            neighbors[seat]
                .iter()
                .filter_map(|other| local.get(other).copied())
                .collect()
        })
        .collect();

    // 二染色
    let mut side: Vec<Option<bool>> = vec![None; seats.len()];
    for start in 0..seats.len() {
        if side[start].is_some() {
            continue;
        }
        side[start] = Some(false);
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            let color = side[v] == Some(true);
            for &u in &adjacency[v] {
                match side[u] {
                    None => {
                        side[u] = Some(!color);
                        queue.push_back(u);
                    }
                    Some(c) if c == color => return seats.len(),
                    Some(_) => {}
                }
            }
        }
    }

    // 增广路匹配: mate[右侧顶点] = 左侧顶点
    let mut mate: Vec<Option<usize>> = vec![None; seats.len()];
    let mut matched = 0;
    for v in 0..seats.len() {
        if side[v] != Some(false) {
            continue;
        }
        let mut visited = vec![false; seats.len()];
        if augment(v, &adjacency, &mut mate, &mut visited) {
            matched += 1;
        }
    }

    seats.len() - matched
}

fn augment(
    v: usize,
    adjacency: &[Vec<usize>],
    mate: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &u in &adjacency[v] {
        if visited[u] {
            continue;
        }
        visited[u] = true;
        let free = match mate[u] {
            None => true,
            Some(w) => augment(w, adjacency, mate, visited),
        };
        if free {
            mate[u] = Some(v);
            return true;
        }
    }
    false
}
