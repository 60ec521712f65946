//! スタッフタスク: キュー・オーケストレーター・配車・ライフサイクル通知

pub mod dispatch;
pub mod lifecycle;
mod orchestrator;
mod queue;
mod types;

pub use orchestrator::Orchestrator;
pub use queue::TaskQueue;
pub use types::{
    AssignResult, CancelReason, QueuedTask, Task, TaskError, TaskHandles, TaskId, TaskKind,
    TaskLifecycle,
};
