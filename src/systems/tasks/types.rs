//! タスク関連の型定義

use bevy::prelude::*;
use std::fmt;
use thiserror::Error;

/// タスク識別子（オーケストレーターが採番する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// スタッフの仕事の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[non_exhaustive]
pub enum TaskKind {
    /// 客の注文を取る（ダイアログ終了で完了）
    TakeOrder,
    /// 注文の品を届ける
    ServeOrder,
    /// 空いたテーブルを片付ける
    CleanTable,
}

/// 割り当て済みタスクの表示用ハンドル（マーカーエンティティ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskHandles {
    /// ターゲット側に出すマーカー
    pub target_marker: Option<Entity>,
    /// 担当スタッフの頭上に出すマーカー
    pub staff_marker: Option<Entity>,
}

impl TaskHandles {
    pub fn is_empty(&self) -> bool {
        self.target_marker.is_none() && self.staff_marker.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> {
        self.target_marker.into_iter().chain(self.staff_marker)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub target: Entity,
    pub assignee: Option<Entity>,
    pub handles: TaskHandles,
}

impl Task {
    pub fn queued(&self) -> QueuedTask {
        QueuedTask {
            id: self.id,
            kind: self.kind,
            target: self.target,
        }
    }
}

/// キューに積まれるタスクの写し
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub target: Entity,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// キューが上限に達している（呼び出し側が別のスタッフを選ぶ）
    #[error("task queue is full")]
    QueueFull,
    /// 存在しない・既に終わったタスク、または消えたターゲット
    #[error("task or its target no longer exists")]
    InvalidTarget,
    #[error("staff {0} has no task queue")]
    UnknownStaff(Entity),
}

/// 割り当て要求の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignResult {
    Accepted,
    Rejected(TaskError),
}

impl AssignResult {
    pub fn is_accepted(self) -> bool {
        matches!(self, AssignResult::Accepted)
    }
}

/// キャンセルの理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// 明示的なキャンセル要求
    Requested,
    /// 同じターゲットのタスクが他で完了・キャンセルされた
    Superseded,
    /// ターゲットが消えた
    TargetLost,
}

/// プレゼンテーション層に伝えるタスクのライフサイクル
#[derive(Debug, Clone, PartialEq)]
pub enum TaskLifecycle {
    Assigned {
        task: TaskId,
        kind: TaskKind,
        target: Entity,
        staff: Entity,
    },
    /// 別スタッフへの付け替えで外れた（ハンドルは作り直す）
    Unassigned {
        task: TaskId,
        staff: Entity,
        handles: TaskHandles,
    },
    Completed {
        task: TaskId,
        kind: TaskKind,
        target: Entity,
        staff: Option<Entity>,
        handles: TaskHandles,
    },
    Cancelled {
        task: TaskId,
        kind: TaskKind,
        target: Entity,
        staff: Option<Entity>,
        handles: TaskHandles,
        reason: CancelReason,
    },
}
