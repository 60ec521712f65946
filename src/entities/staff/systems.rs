use super::{StaffAgent, StaffSignal};
use crate::constants::{STAFF_HOME_GRID, STAFF_SPEED, Z_CHARACTER};
use crate::events::{OrderInteractionFinished, OrderInteractionStarted};
use crate::systems::tasks::{Orchestrator, Task};
use crate::world::WorldMap;
use bevy::prelude::*;

/// スタッフを配置し、オーケストレーターにキューを作らせる
pub fn spawn_staff(
    commands: &mut Commands,
    world_map: &WorldMap,
    orchestrator: &mut Orchestrator,
    count: usize,
    queue_bound: usize,
) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let grid = (STAFF_HOME_GRID.0 - i as i32, STAFF_HOME_GRID.1);
            let cell = world_map
                .nearest_walkable_grid(world_map.grid_to_world(grid.0, grid.1))
                .unwrap_or(grid);
            let pos = world_map.grid_to_world(cell.0, cell.1);
            let entity = commands
                .spawn((
                    StaffAgent::new(STAFF_SPEED),
                    Name::new(format!("Staff {}", i + 1)),
                    Transform::from_xyz(pos.x, pos.y, Z_CHARACTER),
                ))
                .id();
            orchestrator.register_staff(entity, queue_bound);
            info!("SPAWN: staff {:?} at {:?} (queue bound {})", entity, cell, queue_bound);
            entity
        })
        .collect()
}

/// スタッフが消えたら、抱えていたタスクを未割り当てに戻す
pub fn on_staff_removed(remove: On<Remove, StaffAgent>, mut orchestrator: ResMut<Orchestrator>) {
    let staff = remove.entity;
    let returned = orchestrator.unregister_staff(staff);
    if !returned.is_empty() {
        info!("TASK: staff {:?} left, {} task(s) back to the pool", staff, returned.len());
    }
}

/// 登録順にスタッフを1tick進める（未登録のスタッフは最後）
pub fn staff_tick_system(
    time: Res<Time>,
    world_map: Res<WorldMap>,
    mut orchestrator: ResMut<Orchestrator>,
    mut q_staff: Query<(Entity, &mut StaffAgent, &mut Transform)>,
    q_targets: Query<&Transform, Without<StaffAgent>>,
    mut ev_finished: MessageReader<OrderInteractionFinished>,
    mut ev_started: MessageWriter<OrderInteractionStarted>,
) {
    for event in ev_finished.read() {
        if let Ok((_, mut agent, _)) = q_staff.get_mut(event.staff) {
            debug!("ORDER: staff {:?} finished with guest {:?}", event.staff, event.guest);
            agent.notify_interaction_finished(event.task);
        }
    }

    let dt = time.delta_secs();
    let mut order: Vec<Entity> = orchestrator.staff().collect();
    let mut unregistered: Vec<Entity> = q_staff
        .iter()
        .map(|(entity, _, _)| entity)
        .filter(|entity| !order.contains(entity))
        .collect();
    unregistered.sort();
    order.extend(unregistered);

    for staff in order {
        let Ok((_, mut agent, mut transform)) = q_staff.get_mut(staff) else {
            continue;
        };
        let current = orchestrator.current_task(staff).map(Task::queued);

        let mut pos = transform.translation.truncate();
        let signal = agent.tick(&mut pos, dt, current, &*world_map, |target| {
            q_targets
                .get(target)
                .ok()
                .map(|t| t.translation.truncate())
        });
        if pos != transform.translation.truncate() {
            transform.translation.x = pos.x;
            transform.translation.y = pos.y;
        }

        match signal {
            Some(StaffSignal::BeginInteraction { task, target }) => {
                ev_started.write(OrderInteractionStarted {
                    staff,
                    guest: target,
                    task,
                });
            }
            Some(StaffSignal::Completed { task }) => {
                orchestrator.complete_task(task);
            }
            Some(StaffSignal::InvalidTarget { task, target }) => {
                warn!("TASK: {} target {:?} is gone", task, target);
                orchestrator.cancel_tasks_for_target(target);
            }
            Some(StaffSignal::PathBlocked { task }) => {
                warn!("PATH: staff {:?} cannot reach the target of {}", staff, task);
            }
            None => {}
        }
    }
}
