//! タスクの生成と配車 (Event -> Orchestrator)
//!
//! - 客の着席・注文完了・退店からタスクを作る
//! - 手動割り当て要求を処理する
//! - 未割り当てタスクを一番空いているスタッフに回す

use super::{AssignResult, Orchestrator, TaskId, TaskKind};
use crate::config::SimConfig;
use crate::events::{
    GuestDepartedEvent, GuestSeatedEvent, TaskAssignmentRejected, TaskAssignmentRequest,
    TaskCompletedEvent,
};
use bevy::prelude::*;

/// 同じターゲット・種類のタスクが既にあればそれを、なければ新しく作る
pub fn ensure_task(orchestrator: &mut Orchestrator, kind: TaskKind, target: Entity) -> TaskId {
    match orchestrator.find_task(target, kind) {
        Some(existing) => existing,
        None => orchestrator.create_task(kind, target),
    }
}

/// スタッフ1人ぶんの負荷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffLoad {
    pub staff: Entity,
    pub tasks: usize,
    pub bound: usize,
}

/// 登録順に並べた全スタッフの負荷
pub fn staff_loads(orchestrator: &Orchestrator) -> Vec<StaffLoad> {
    orchestrator
        .staff()
        .filter_map(|staff| {
            orchestrator.queue(staff).map(|queue| StaffLoad {
                staff,
                tasks: queue.len(),
                bound: queue.bound(),
            })
        })
        .collect()
}

/// キューに空きのあるスタッフのうち、抱えているタスクが最も少ない者（同数なら登録順）
pub fn least_loaded(loads: &[StaffLoad]) -> Option<usize> {
    loads
        .iter()
        .enumerate()
        .filter(|(_, load)| load.tasks < load.bound)
        .min_by_key(|(_, load)| load.tasks)
        .map(|(idx, _)| idx)
}

pub fn task_creation_system(
    mut orchestrator: ResMut<Orchestrator>,
    mut ev_seated: MessageReader<GuestSeatedEvent>,
    mut ev_completed: MessageReader<TaskCompletedEvent>,
    mut ev_departed: MessageReader<GuestDepartedEvent>,
) {
    for event in ev_seated.read() {
        let id = ensure_task(&mut orchestrator, TaskKind::TakeOrder, event.guest);
        debug!(
            "TASK: {} for guest {:?} at table {:?} seat {}",
            id, event.guest, event.table, event.seat_index
        );
    }

    for event in ev_completed.read() {
        if event.kind == TaskKind::TakeOrder {
            ensure_task(&mut orchestrator, TaskKind::ServeOrder, event.target);
        }
    }

    for event in ev_departed.read() {
        let id = ensure_task(&mut orchestrator, TaskKind::CleanTable, event.table);
        debug!("TASK: {} after guest {:?} left", id, event.guest);
    }
}

pub fn task_assignment_request_system(
    mut requests: MessageReader<TaskAssignmentRequest>,
    mut orchestrator: ResMut<Orchestrator>,
    mut ev_rejected: MessageWriter<TaskAssignmentRejected>,
) {
    for request in requests.read() {
        let result = orchestrator.assign(request.task, request.staff);
        if result.is_accepted() {
            debug!("TASK: {} -> staff {:?}", request.task, request.staff);
        } else if let AssignResult::Rejected(reason) = result {
            warn!(
                "TASK: request {} -> staff {:?} rejected: {}",
                request.task, request.staff, reason
            );
            ev_rejected.write(TaskAssignmentRejected {
                task: request.task,
                staff: request.staff,
                reason,
            });
        }
    }
}

/// 未割り当てタスクを一番空いているスタッフへの割り当て要求にする
pub fn auto_dispatch_system(
    config: Res<SimConfig>,
    orchestrator: Res<Orchestrator>,
    mut requests: MessageWriter<TaskAssignmentRequest>,
) {
    if !config.auto_dispatch {
        return;
    }

    let mut loads = staff_loads(&orchestrator);
    for task in orchestrator.unassigned() {
        // 全員満杯なら次フレームに持ち越す
        let Some(idx) = least_loaded(&loads) else {
            break;
        };
        loads[idx].tasks += 1;
        requests.write(TaskAssignmentRequest {
            task: task.id,
            staff: loads[idx].staff,
        });
    }
}
