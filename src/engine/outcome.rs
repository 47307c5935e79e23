// ==========================================
// AssignmentOutcome - 单次编排的完整结果
// ==========================================
// 红线: 每次运行新建, 运行结束后不再修改
// ==========================================

use crate::domain::placement::{Placement, SeatingStatistics, SeatingWarning};
use crate::domain::types::SolveMode;
use crate::engine::error::EngineError;
use crate::i18n::t_with_args;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentOutcome {
    pub run_id: Uuid,
    pub success: bool,
    /// 失败时为 None
    pub solve_mode: Option<SolveMode>,
    pub placements: Vec<Placement>,
    pub statistics: Option<SeatingStatistics>,
    pub errors: Vec<EngineError>,
    pub warnings: Vec<SeatingWarning>,
    pub roster: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

impl AssignmentOutcome {
    /// 失败结果（不含任何落位）
    pub fn failed(run_id: Uuid, errors: Vec<EngineError>) -> Self {
        Self {
            run_id,
            success: false,
            solve_mode: None,
            placements: Vec::new(),
            statistics: None,
            errors,
            warnings: Vec::new(),
            roster: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    /// 全部错误文本
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// 单行结果摘要
    ///
    /// # 参数
    /// - locale: 语言代码（未知语言回退为中文）
    pub fn summary(&self, locale: &str) -> String {
        if !self.success {
            let count = self.errors.len().to_string();
            return t_with_args(locale, "outcome.failure", &[("count", &count)]);
        }

        let placed = self.placements.len().to_string();
        let total = self
            .statistics
            .as_ref()
            .map_or(self.placements.len(), |s| s.total_members)
            .to_string();
        let mode = self.solve_mode.map(|m| m.to_string()).unwrap_or_default();
        t_with_args(
            locale,
            "outcome.success",
            &[("placed", &placed), ("total", &total), ("mode", &mode)],
        )
    }

    /// 某考生的落位
    pub fn placement_of(&self, member_id: crate::domain::types::MemberId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.member_id == member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_summary_counts_errors() {
        let outcome = AssignmentOutcome::failed(
            Uuid::new_v4(),
            vec![EngineError::EmptyMembers, EngineError::EmptyRooms],
        );
        assert_eq!(outcome.summary("en"), "Seating failed: 2 error(s)");
        assert_eq!(outcome.summary("zh-CN"), "编排失败: 2 个错误");
    }

    #[test]
    fn test_success_summary_reports_mode() {
        let mut outcome = AssignmentOutcome::failed(Uuid::new_v4(), Vec::new());
        outcome.success = true;
        outcome.solve_mode = Some(SolveMode::Overflow);

        assert_eq!(
            outcome.summary("en"),
            "Seating complete: 0/0 members placed (mode OVERFLOW)"
        );
    }
}
