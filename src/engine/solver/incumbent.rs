// ==========================================
// 共享最优解（多线程）
// ==========================================
// 键: (目标值, 子树序号) 打包为 u64, 高 32 位为目标值
// 字典序比较保证结果与单线程深度优先顺序一致
// ==========================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[inline]
fn pack(objective: usize, subtree: usize) -> u64 {
    let objective = objective.min(u32::MAX as usize) as u64;
    let subtree = subtree.min(u32::MAX as usize) as u64;
    (objective << 32) | subtree
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncumbentSnapshot {
    pub objective: usize,
    pub subtree: usize,
    pub labels: Vec<Option<usize>>,
}

#[derive(Debug)]
pub struct SharedIncumbent {
    best_key: AtomicU64,
    solution: Mutex<Option<IncumbentSnapshot>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIncumbent {
    pub fn new() -> Self {
        Self {
            best_key: AtomicU64::new(u64::MAX),
            solution: Mutex::new(None),
        }
    }

    /// 子树 subtree 中下界为 lower_bound 的节点是否已无改进可能
    #[inline]
    pub fn dominates(&self, lower_bound: usize, subtree: usize) -> bool {
        pack(lower_bound, subtree) >= self.best_key.load(Ordering::Acquire)
    }

    /// 尝试写入候选解，字典序更小时成功
    pub fn try_install(&self, objective: usize, subtree: usize, labels: &[Option<usize>]) -> bool {
        let key = pack(objective, subtree);
        if key >= self.best_key.load(Ordering::Acquire) {
            return false;
        }

        // 锁中毒只可能来自其他线程 panic，此时仍以锁内数据为准
        let mut guard = match self.solution.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(current) = guard.as_ref() {
            if key >= pack(current.objective, current.subtree) {
                return false;
            }
        }

        *guard = Some(IncumbentSnapshot {
            objective,
            subtree,
            labels: labels.to_vec(),
        });
        self.best_key.store(key, Ordering::Release);
        true
    }

    pub fn snapshot(&self) -> Option<IncumbentSnapshot> {
        let guard = match self.solution.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lexicographic_install() {
        let inc = SharedIncumbent::new();
        assert_eq!(inc.snapshot(), None);

        assert!(inc.try_install(2, 5, &[Some(0)]));
        // 同目标值、更大子树序号: 拒绝
        assert!(!inc.try_install(2, 7, &[Some(1)]));
        // 同目标值、更小子树序号: 接受
        assert!(inc.try_install(2, 3, &[Some(2)]));
        // 更小目标值: 接受
        assert!(inc.try_install(1, 9, &[None]));

        let snap = inc.snapshot().unwrap();
        assert_eq!((snap.objective, snap.subtree), (1, 9));
        assert_eq!(snap.labels, vec![None]);
    }

    #[test]
    fn test_dominates() {
        let inc = SharedIncumbent::new();
        assert!(!inc.dominates(100, 100));
        inc.try_install(1, 4, &[]);
        assert!(inc.dominates(2, 0));
        assert!(inc.dominates(1, 4));
        assert!(inc.dominates(1, 6));
        assert!(!inc.dominates(1, 2));
        assert!(!inc.dominates(0, 10));
    }

    #[test]
    fn test_concurrent_installs_keep_minimum() {
        let inc = Arc::new(SharedIncumbent::new());
        std::thread::scope(|scope| {
            for t in 0..4usize {
                let inc = Arc::clone(&inc);
                scope.spawn(move || {
                    for obj in (0..50usize).rev() {
                        inc.try_install(obj, t, &[]);
                    }
                });
            }
        });
        let snap = inc.snapshot().unwrap();
        assert_eq!((snap.objective, snap.subtree), (0, 0));
    }
}
