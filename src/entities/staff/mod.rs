//! スタッフエージェント
//!
//! タスクキューの current を1件ずつこなす。キューを書き換えるのはオーケストレーターだけで、
//! スタッフは結果を `StaffSignal` として返す。

mod state_machine;
pub mod systems;

pub use state_machine::StaffSignal;

use crate::entities::movement::Path;
use crate::systems::tasks::{QueuedTask, TaskKind};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum StaffState {
    #[default]
    Idle,
    Walking,
    Executing(TaskKind),
}

#[derive(Component, Debug, Clone)]
pub struct StaffAgent {
    state: StaffState,
    /// 今取り組んでいるタスク（キューの current の写し）
    active: Option<QueuedTask>,
    path: Path,
    /// 経路を計画済みか
    planned: bool,
    interaction_finished: bool,
    speed: f32,
    retry_cooldown: u8,
}

impl StaffAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            state: StaffState::Idle,
            active: None,
            path: Path::default(),
            planned: false,
            interaction_finished: false,
            speed,
            retry_cooldown: 0,
        }
    }

    pub fn state(&self) -> StaffState {
        self.state
    }
}
