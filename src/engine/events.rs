// ==========================================
// 考场座位编排引擎 - 引擎层事件发布
// ==========================================
// 职责: 定义运行阶段事件发布 trait，实现依赖倒置
// 说明: Engine 层定义 trait，调用方（界面进度条、审计日志等）实现
// ==========================================

use crate::domain::types::EngineStage;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 编排事件
// ==========================================

/// 阶段迁移事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingEvent {
    /// 运行 ID
    pub run_id: Uuid,
    /// 迁移前阶段（首个事件为 None）
    pub from: Option<EngineStage>,
    /// 迁移后阶段
    pub to: EngineStage,
    /// 附加说明
    pub detail: Option<String>,
}

impl SeatingEvent {
    pub fn transition(run_id: Uuid, from: Option<EngineStage>, to: EngineStage) -> Self {
        Self {
            run_id,
            from,
            to,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 编排事件发布者 Trait
///
/// 发布失败只记录告警，不影响编排结果
pub trait SeatingEventPublisher: Send + Sync {
    /// 发布事件
    ///
    /// # 参数
    /// - `event`: 阶段迁移事件
    fn publish(&self, event: SeatingEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl SeatingEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: SeatingEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::trace!(run_id = %event.run_id, to = %event.to, "NoOpEventPublisher: 跳过事件发布");
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn SeatingEventPublisher>> 的使用
#[derive(Clone, Default)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn SeatingEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn SeatingEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: SeatingEvent) {
        if let Some(publisher) = &self.inner {
            let run_id = event.run_id;
            let to = event.to;
            if let Err(e) = publisher.publish(event) {
                tracing::warn!(run_id = %run_id, to = %to, error = %e, "编排事件发布失败");
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl std::fmt::Debug for OptionalEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalEventPublisher")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// 收集事件的发布者（测试与调试用）
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: std::sync::Mutex<Vec<SeatingEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到的事件（按发布顺序）
    pub fn events(&self) -> Vec<SeatingEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 已经历的阶段序列
    pub fn stages(&self) -> Vec<EngineStage> {
        self.events().into_iter().map(|e| e.to).collect()
    }
}

impl SeatingEventPublisher for RecordingEventPublisher {
    fn publish(&self, event: SeatingEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.events
            .lock()
            .map_err(|_| "事件记录锁已损坏")?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingPublisher;

    impl SeatingEventPublisher for FailingPublisher {
        fn publish(&self, _event: SeatingEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
            Err("下游不可用".into())
        }
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        publisher.publish(SeatingEvent::transition(Uuid::new_v4(), None, EngineStage::Validating));
    }

    #[test]
    fn test_recording_publisher_keeps_order() {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let publisher = OptionalEventPublisher::with_publisher(recorder.clone());
        let run_id = Uuid::new_v4();

        publisher.publish(SeatingEvent::transition(run_id, None, EngineStage::Validating));
        publisher.publish(
            SeatingEvent::transition(run_id, Some(EngineStage::Validating), EngineStage::Failed)
                .with_detail("EmptyMembers"),
        );

        assert_eq!(recorder.stages(), vec![EngineStage::Validating, EngineStage::Failed]);
        assert_eq!(recorder.events()[1].detail.as_deref(), Some("EmptyMembers"));
    }

    #[test]
    fn test_publish_failure_is_swallowed() {
        let publisher = OptionalEventPublisher::with_publisher(Arc::new(FailingPublisher));
        publisher.publish(SeatingEvent::transition(Uuid::new_v4(), None, EngineStage::Validating));
    }
}
