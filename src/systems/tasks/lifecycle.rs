//! オーケストレーターのライフサイクル記録を Bevy のイベントへ流す
//!
//! 割り当て・完了・取り消しは Observer（`OnTask*`）として発火し、
//! 完了はさらに `TaskCompletedEvent` メッセージとしてロジック側にも届く。

use super::{Orchestrator, TaskKind, TaskLifecycle};
use crate::events::{
    OnTaskAssigned, OnTaskCancelled, OnTaskCompleted, OnTaskUnassigned, TaskCompletedEvent,
};
use crate::systems::service::OrderScoring;
use bevy::prelude::*;

pub fn task_lifecycle_system(
    mut commands: Commands,
    mut orchestrator: ResMut<Orchestrator>,
    mut scoring: ResMut<OrderScoring>,
    mut ev_completed: MessageWriter<TaskCompletedEvent>,
) {
    for event in orchestrator.drain_events() {
        match event {
            TaskLifecycle::Assigned {
                task,
                kind,
                target,
                staff,
            } => {
                commands.trigger(OnTaskAssigned {
                    entity: staff,
                    task,
                    kind,
                    target,
                });
            }
            TaskLifecycle::Unassigned {
                task,
                staff,
                handles,
            } => {
                commands.trigger(OnTaskUnassigned {
                    task,
                    staff,
                    handles,
                });
            }
            TaskLifecycle::Completed {
                task,
                kind,
                target,
                staff,
                handles,
            } => {
                // 提供の結果だけ採点する
                let score = (kind == TaskKind::ServeOrder).then(|| scoring.score(target));
                if let Some(score) = score {
                    info!("SERVE: {} for guest {:?} scored {}", task, target, score);
                }
                ev_completed.write(TaskCompletedEvent {
                    task,
                    kind,
                    target,
                    staff,
                    score,
                });
                commands.trigger(OnTaskCompleted {
                    task,
                    kind,
                    target,
                    staff,
                    handles,
                });
            }
            TaskLifecycle::Cancelled {
                task,
                kind,
                target,
                staff,
                handles,
                reason,
            } => {
                commands.trigger(OnTaskCancelled {
                    task,
                    kind,
                    target,
                    staff,
                    handles,
                    reason,
                });
            }
        }
    }
}
