use crate::entities::guest::GuestState;
use crate::systems::tasks::{CancelReason, TaskError, TaskHandles, TaskId, TaskKind};
use bevy::prelude::*;

// ============================================================
// 客
// ============================================================

/// 客が席に着いた
#[derive(Message, Debug, Clone, Copy)]
pub struct GuestSeatedEvent {
    pub guest: Entity,
    pub table: Entity,
    pub seat_index: usize,
}

/// 客の状態が変わった
#[derive(Message, Debug, Clone, Copy)]
pub struct GuestStateChangedEvent {
    pub guest: Entity,
    pub from: GuestState,
    pub to: GuestState,
}

/// 客が飲み終えて店を出た（席は解放済み）
#[derive(Message, Debug, Clone, Copy)]
pub struct GuestDepartedEvent {
    pub guest: Entity,
    pub table: Entity,
}

// ============================================================
// 注文ダイアログ
// ============================================================

/// スタッフが客の前で注文を取り始めた
#[derive(Message, Debug, Clone, Copy)]
pub struct OrderInteractionStarted {
    pub staff: Entity,
    pub guest: Entity,
    pub task: TaskId,
}

/// 注文ダイアログが終わった（スタッフ側の完了通知になる）
#[derive(Message, Debug, Clone, Copy)]
pub struct OrderInteractionFinished {
    pub staff: Entity,
    pub guest: Entity,
    pub task: TaskId,
}

// ============================================================
// タスク割り当て (Request -> Orchestrator)
// ============================================================

/// 手動割り当ての要求
#[derive(Message, Debug, Clone, Copy)]
pub struct TaskAssignmentRequest {
    pub task: TaskId,
    pub staff: Entity,
}

/// 割り当て要求が拒否された（呼び出し側が別のスタッフを選ぶ）
#[derive(Message, Debug, Clone, Copy)]
pub struct TaskAssignmentRejected {
    pub task: TaskId,
    pub staff: Entity,
    pub reason: TaskError,
}

/// タスクの完了（スコア付き）
#[derive(Message, Debug, Clone, Copy)]
pub struct TaskCompletedEvent {
    pub task: TaskId,
    pub kind: TaskKind,
    pub target: Entity,
    pub staff: Option<Entity>,
    pub score: Option<u32>,
}

// ============================================================
// タスクライフサイクル（プレゼンテーション層向け Observer イベント）
// ============================================================

/// スタッフにタスクが割り当てられた
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct OnTaskAssigned {
    pub entity: Entity, // Observerのターゲット（スタッフ）
    pub task: TaskId,
    pub kind: TaskKind,
    pub target: Entity,
}

/// 付け替えでスタッフから外れた
#[derive(Event, Debug, Clone, Copy)]
pub struct OnTaskUnassigned {
    pub task: TaskId,
    pub staff: Entity,
    pub handles: TaskHandles,
}

/// タスクが完了した
#[derive(Event, Debug, Clone, Copy)]
pub struct OnTaskCompleted {
    pub task: TaskId,
    pub kind: TaskKind,
    pub target: Entity,
    pub staff: Option<Entity>,
    pub handles: TaskHandles,
}

/// タスクが取り消された
#[derive(Event, Debug, Clone, Copy)]
pub struct OnTaskCancelled {
    pub task: TaskId,
    pub kind: TaskKind,
    pub target: Entity,
    pub staff: Option<Entity>,
    pub handles: TaskHandles,
    pub reason: CancelReason,
}
