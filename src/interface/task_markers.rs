//! タスクマーカー（割り当て済みタスクの表示ハンドル）
//!
//! 割り当て時にターゲット側とスタッフ頭上の2つを作り、オーケストレーターに結び付ける。
//! 完了・取り消し・付け替えで消す。

use crate::constants::{TASK_MARKER_OFFSET_Y, Z_TASK_MARKER};
use crate::events::{OnTaskAssigned, OnTaskCancelled, OnTaskCompleted, OnTaskUnassigned};
use crate::relationships::MarkerOf;
use crate::systems::tasks::{Orchestrator, TaskHandles, TaskId, TaskKind};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MarkerRole {
    /// 客・テーブルの上
    Target,
    /// 担当スタッフの頭上
    Staff,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMarker {
    pub task: TaskId,
    pub kind: TaskKind,
    pub role: MarkerRole,
}

fn spawn_marker(
    commands: &mut Commands,
    marker: TaskMarker,
    anchor: Entity,
    q_anchors: &Query<&Transform, Without<TaskMarker>>,
) -> Option<Entity> {
    let anchor_pos = q_anchors.get(anchor).ok()?.translation;
    let entity = commands
        .spawn((
            marker,
            MarkerOf(anchor),
            Transform::from_xyz(
                anchor_pos.x,
                anchor_pos.y + TASK_MARKER_OFFSET_Y,
                Z_TASK_MARKER,
            ),
        ))
        .id();
    Some(entity)
}

fn despawn_markers(
    commands: &mut Commands,
    task: TaskId,
    handles: TaskHandles,
    q_markers: &Query<(Entity, &TaskMarker)>,
) {
    // リンク前に外れたマーカーも拾う
    let mut doomed: Vec<Entity> = handles.iter().collect();
    doomed.extend(
        q_markers
            .iter()
            .filter(|(_, marker)| marker.task == task)
            .map(|(entity, _)| entity),
    );
    doomed.sort();
    doomed.dedup();
    for entity in doomed {
        if let Ok(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.try_despawn();
        }
    }
}

pub fn on_task_assigned(
    on: On<OnTaskAssigned>,
    mut commands: Commands,
    mut orchestrator: ResMut<Orchestrator>,
    q_anchors: Query<&Transform, Without<TaskMarker>>,
) {
    let staff = on.entity;
    let event = *on.event();

    let target_marker = spawn_marker(
        &mut commands,
        TaskMarker {
            task: event.task,
            kind: event.kind,
            role: MarkerRole::Target,
        },
        event.target,
        &q_anchors,
    );
    let staff_marker = spawn_marker(
        &mut commands,
        TaskMarker {
            task: event.task,
            kind: event.kind,
            role: MarkerRole::Staff,
        },
        staff,
        &q_anchors,
    );
    let handles = TaskHandles {
        target_marker,
        staff_marker,
    };

    if !orchestrator.link_handles(event.task, handles) {
        // 通知が届く前にタスクが終わっていた
        for entity in handles.iter() {
            commands.entity(entity).despawn();
        }
    }
}

pub fn on_task_unassigned(
    on: On<OnTaskUnassigned>,
    mut commands: Commands,
    q_markers: Query<(Entity, &TaskMarker)>,
) {
    let event = on.event();
    debug!("TASK: {} taken off staff {:?}", event.task, event.staff);
    despawn_markers(&mut commands, event.task, event.handles, &q_markers);
}

pub fn on_task_completed(
    on: On<OnTaskCompleted>,
    mut commands: Commands,
    q_markers: Query<(Entity, &TaskMarker)>,
) {
    let event = on.event();
    debug!(
        "TASK: {} {:?} on {:?} done by {:?}",
        event.task, event.kind, event.target, event.staff
    );
    despawn_markers(&mut commands, event.task, event.handles, &q_markers);
}

pub fn on_task_cancelled(
    on: On<OnTaskCancelled>,
    mut commands: Commands,
    q_markers: Query<(Entity, &TaskMarker)>,
) {
    let event = on.event();
    debug!(
        "TASK: {} {:?} on {:?} cancelled ({:?}, staff {:?})",
        event.task, event.kind, event.target, event.reason, event.staff
    );
    despawn_markers(&mut commands, event.task, event.handles, &q_markers);
}

/// マーカーを表示先の頭上に追従させる
pub fn task_marker_follow_system(
    q_anchors: Query<&Transform, Without<TaskMarker>>,
    mut q_markers: Query<(&MarkerOf, &mut Transform), With<TaskMarker>>,
) {
    for (marker_of, mut transform) in q_markers.iter_mut() {
        let Ok(anchor) = q_anchors.get(marker_of.0) else {
            continue;
        };
        let target = Vec3::new(
            anchor.translation.x,
            anchor.translation.y + TASK_MARKER_OFFSET_Y,
            Z_TASK_MARKER,
        );
        if transform.translation != target {
            transform.translation = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TaskCompletedEvent;
    use crate::relationships::TaskMarkers;
    use crate::systems::service::OrderScoring;
    use crate::systems::tasks::lifecycle::task_lifecycle_system;

    fn app() -> App {
        let mut app = App::new();
        app.add_message::<TaskCompletedEvent>()
            .init_resource::<Orchestrator>()
            .init_resource::<OrderScoring>()
            .add_observer(on_task_assigned)
            .add_observer(on_task_unassigned)
            .add_observer(on_task_completed)
            .add_observer(on_task_cancelled)
            .add_systems(
                Update,
                (task_lifecycle_system, task_marker_follow_system).chain(),
            );
        app
    }

    fn marker_count(app: &mut App) -> usize {
        let mut query = app.world_mut().query::<&TaskMarker>();
        query.iter(app.world()).count()
    }

    #[test]
    fn assigned_task_gets_linked_markers_that_vanish_on_completion() {
        let mut app = app();
        let staff = app.world_mut().spawn(Transform::default()).id();
        let guest = app.world_mut().spawn(Transform::from_xyz(64.0, 0.0, 0.0)).id();
        let task = {
            let mut orchestrator = app.world_mut().resource_mut::<Orchestrator>();
            orchestrator.register_staff(staff, 3);
            let task = orchestrator.create_task(TaskKind::TakeOrder, guest);
            assert!(orchestrator.assign(task, staff).is_accepted());
            task
        };

        app.update();

        let handles = app
            .world()
            .resource::<Orchestrator>()
            .task(task)
            .map(|t| t.handles)
            .expect("task is open");
        assert!(handles.target_marker.is_some());
        assert!(handles.staff_marker.is_some());
        assert_eq!(app.world().get::<TaskMarkers>(guest).map(|m| m.len()), Some(1));
        assert_eq!(app.world().get::<TaskMarkers>(staff).map(|m| m.len()), Some(1));

        app.world_mut()
            .resource_mut::<Orchestrator>()
            .complete_task(task);
        app.update();

        assert_eq!(marker_count(&mut app), 0);
    }

    #[test]
    fn reassignment_moves_the_staff_marker() {
        let mut app = app();
        let first = app.world_mut().spawn(Transform::default()).id();
        let second = app.world_mut().spawn(Transform::default()).id();
        let table = app.world_mut().spawn(Transform::default()).id();
        let task = {
            let mut orchestrator = app.world_mut().resource_mut::<Orchestrator>();
            orchestrator.register_staff(first, 3);
            orchestrator.register_staff(second, 3);
            let task = orchestrator.create_task(TaskKind::CleanTable, table);
            assert!(orchestrator.assign(task, first).is_accepted());
            task
        };
        app.update();

        assert!(
            app.world_mut()
                .resource_mut::<Orchestrator>()
                .assign(task, second)
                .is_accepted()
        );
        app.update();

        assert_eq!(marker_count(&mut app), 2);
        assert!(app.world().get::<TaskMarkers>(first).is_none_or(|m| m.is_empty()));
        assert_eq!(app.world().get::<TaskMarkers>(second).map(|m| m.len()), Some(1));
    }

    #[test]
    fn markers_follow_their_anchor() {
        let mut app = app();
        let staff = app.world_mut().spawn(Transform::default()).id();
        let guest = app.world_mut().spawn(Transform::default()).id();
        {
            let mut orchestrator = app.world_mut().resource_mut::<Orchestrator>();
            orchestrator.register_staff(staff, 3);
            let task = orchestrator.create_task(TaskKind::ServeOrder, guest);
            assert!(orchestrator.assign(task, staff).is_accepted());
        }
        app.update();

        if let Some(mut transform) = app.world_mut().get_mut::<Transform>(guest) {
            transform.translation.x = 100.0;
        }
        app.update();

        let markers = app.world().get::<TaskMarkers>(guest).expect("guest marker");
        let marker = *markers.iter().next().expect("one marker");
        let pos = app.world().get::<Transform>(marker).map(|t| t.translation);
        assert_eq!(
            pos,
            Some(Vec3::new(100.0, TASK_MARKER_OFFSET_Y, Z_TASK_MARKER))
        );
    }
}
