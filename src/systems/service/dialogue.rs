//! 注文ダイアログ
//!
//! 台詞の再生はしない。開始から所定の秒数が経ったら終了を通知するだけ。

use crate::config::SimConfig;
use crate::entities::guest::GuestAgent;
use crate::events::{OrderInteractionFinished, OrderInteractionStarted};
use crate::systems::tasks::{Orchestrator, TaskId};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderDialogue {
    pub staff: Entity,
    pub guest: Entity,
    pub task: TaskId,
    remaining: f32,
}

/// 進行中のダイアログ（スタッフ1人につき1つ）
#[derive(Resource, Debug, Default)]
pub struct OrderDialogues {
    active: Vec<OrderDialogue>,
}

impl OrderDialogues {
    /// ダイアログを始める。同じスタッフの古いダイアログは打ち切る
    pub fn start(&mut self, staff: Entity, guest: Entity, task: TaskId, secs: f32) {
        self.active.retain(|d| d.staff != staff);
        self.active.push(OrderDialogue {
            staff,
            guest,
            task,
            remaining: secs.max(0.0),
        });
    }

    /// `dt` 秒進め、終わったダイアログを返す
    pub fn advance(&mut self, dt: f32) -> Vec<OrderDialogue> {
        let mut finished = Vec::new();
        self.active.retain_mut(|dialogue| {
            dialogue.remaining -= dt;
            if dialogue.remaining <= 0.0 {
                finished.push(*dialogue);
                false
            } else {
                true
            }
        });
        finished
    }

    /// `keep` を満たさないダイアログを打ち切り、それらを返す
    pub fn drop_unless(
        &mut self,
        mut keep: impl FnMut(&OrderDialogue) -> bool,
    ) -> Vec<OrderDialogue> {
        let mut dropped = Vec::new();
        self.active.retain(|dialogue| {
            let kept = keep(dialogue);
            if !kept {
                dropped.push(*dialogue);
            }
            kept
        });
        dropped
    }
}

pub fn order_dialogue_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut dialogues: ResMut<OrderDialogues>,
    mut orchestrator: ResMut<Orchestrator>,
    q_guests: Query<(), With<GuestAgent>>,
    mut ev_started: MessageReader<OrderInteractionStarted>,
    mut ev_finished: MessageWriter<OrderInteractionFinished>,
) {
    for event in ev_started.read() {
        debug!("ORDER: staff {:?} talking with guest {:?}", event.staff, event.guest);
        dialogues.start(event.staff, event.guest, event.task, config.order_dialogue_secs);
    }

    // 客が帰った・タスクが終わったダイアログは終了通知を出さずに打ち切る
    let dropped =
        dialogues.drop_unless(|d| q_guests.contains(d.guest) && orchestrator.is_active(d.task));
    for dialogue in dropped {
        if !q_guests.contains(dialogue.guest) {
            orchestrator.cancel_task(dialogue.task);
        }
        debug!(
            "ORDER: dialogue of staff {:?} with guest {:?} dropped",
            dialogue.staff, dialogue.guest
        );
    }

    for dialogue in dialogues.advance(time.delta_secs()) {
        info!(
            "ORDER: staff {:?} took the order of guest {:?}",
            dialogue.staff, dialogue.guest
        );
        ev_finished.write(OrderInteractionFinished {
            staff: dialogue.staff,
            guest: dialogue.guest,
            task: dialogue.task,
        });
    }
}
