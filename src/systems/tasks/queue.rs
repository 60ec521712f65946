//! スタッフ1人ぶんのタスクキュー
//!
//! 実行中（current）1件 + 保留 FIFO。合計が上限を超えることはない。

use super::types::{QueuedTask, TaskError, TaskId};
use bevy::prelude::*;
use std::collections::VecDeque;

/// 受理結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// 実行中タスクがなかったので即座に current になった
    Promoted,
    /// 保留列の `position` 番目に入った
    Queued { position: usize },
    AlreadyQueued,
}

/// 削除結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRemoval {
    NotFound,
    /// 保留中のタスクを取り除いた（副作用なし）
    Pending,
    /// 実行中のタスクを取り消した。次のタスクが繰り上がっていれば `promoted`
    Current { promoted: Option<TaskId> },
}

#[derive(Debug, Clone)]
pub struct TaskQueue {
    bound: usize,
    current: Option<QueuedTask>,
    pending: VecDeque<QueuedTask>,
}

impl TaskQueue {
    pub fn new(bound: usize) -> Self {
        Self {
            bound: bound.max(1),
            current: None,
            pending: VecDeque::new(),
        }
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.bound
    }

    pub fn current(&self) -> Option<&QueuedTask> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> impl Iterator<Item = &QueuedTask> {
        self.pending.iter()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.current.is_some_and(|t| t.id == id) || self.pending.iter().any(|t| t.id == id)
    }

    /// 表示順（current → pending）
    pub fn display_order(&self) -> impl Iterator<Item = &QueuedTask> {
        self.current.iter().chain(self.pending.iter())
    }

    pub fn try_enqueue(&mut self, task: QueuedTask) -> Result<Admission, TaskError> {
        if self.contains(task.id) {
            return Ok(Admission::AlreadyQueued);
        }
        if self.is_full() {
            return Err(TaskError::QueueFull);
        }
        if self.current.is_none() {
            self.current = Some(task);
            return Ok(Admission::Promoted);
        }
        self.pending.push_back(task);
        Ok(Admission::Queued {
            position: self.pending.len() - 1,
        })
    }

    pub fn remove(&mut self, id: TaskId) -> QueueRemoval {
        if self.current.is_some_and(|t| t.id == id) {
            self.current = self.pending.pop_front();
            return QueueRemoval::Current {
                promoted: self.current.map(|t| t.id),
            };
        }
        match self.pending.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.pending.remove(idx);
                QueueRemoval::Pending
            }
            None => QueueRemoval::NotFound,
        }
    }

    /// `target` を狙うタスクを全て `remove` と同じ規則で取り除き、そのIDを返す
    pub fn remove_matching_target(&mut self, target: Entity) -> Vec<TaskId> {
        let matching: Vec<TaskId> = self
            .display_order()
            .filter(|t| t.target == target)
            .map(|t| t.id)
            .collect();
        for &id in &matching {
            self.remove(id);
        }
        matching
    }

    /// 全タスクを取り出して空にする
    pub fn drain(&mut self) -> Vec<QueuedTask> {
        let mut drained: Vec<QueuedTask> = self.current.take().into_iter().collect();
        drained.extend(self.pending.drain(..));
        drained
    }
}
