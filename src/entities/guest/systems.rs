use super::{GuestAgent, GuestContext, GuestSignal, GuestState};
use crate::config::SimConfig;
use crate::constants::{ENTRANCE_GRID, GUEST_SPEED, Z_CHARACTER};
use crate::events::{GuestSeatedEvent, GuestStateChangedEvent};
use crate::systems::seating::{TableAvailabilityIndex, WaitingLine};
use crate::systems::service::GuestVisit;
use crate::world::WorldMap;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// 来店のタイマーと揺らぎ用の乱数
#[derive(Resource, Debug)]
pub struct GuestSpawner {
    timer: Timer,
    spawned: usize,
    rng: StdRng,
}

impl GuestSpawner {
    pub fn new(seed: u64, first_interval: f32) -> Self {
        Self {
            timer: Timer::from_seconds(first_interval.max(0.0), TimerMode::Repeating),
            spawned: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 次の来店間隔（基準値の 0.5〜1.5 倍）
    fn next_interval(&mut self, base: f32) -> Duration {
        let factor: f32 = self.rng.gen_range(0.5..1.5);
        Duration::from_secs_f32((base * factor).max(0.0))
    }
}

pub fn guest_spawn_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimConfig>,
    world_map: Res<WorldMap>,
    mut spawner: ResMut<GuestSpawner>,
) {
    if spawner.spawned >= config.max_guests {
        return;
    }
    spawner.timer.tick(time.delta());
    if !spawner.timer.just_finished() {
        return;
    }

    let next = spawner.next_interval(config.guest_spawn_interval);
    spawner.timer.set_duration(next);
    spawner.spawned += 1;

    let pos = world_map.grid_to_world(ENTRANCE_GRID.0, ENTRANCE_GRID.1);
    let guest = commands
        .spawn((
            GuestAgent::new(GUEST_SPEED, spawner.spawned),
            GuestVisit::default(),
            Name::new(format!("Guest {}", spawner.spawned)),
            Transform::from_xyz(pos.x, pos.y, Z_CHARACTER),
        ))
        .id();
    info!(
        "SPAWN: guest {:?} arrived ({}/{})",
        guest, spawner.spawned, config.max_guests
    );
}

/// 全ての客を決まった順序（列の先頭から、残りは来店順）で1tick進める
pub fn guest_tick_system(
    time: Res<Time>,
    world_map: Res<WorldMap>,
    mut tables: ResMut<TableAvailabilityIndex>,
    mut line: ResMut<WaitingLine>,
    mut q_guests: Query<(Entity, &mut GuestAgent, &mut Transform)>,
    mut ev_seated: MessageWriter<GuestSeatedEvent>,
    mut ev_state: MessageWriter<GuestStateChangedEvent>,
) {
    let dt = time.delta_secs();

    let mut order: Vec<(usize, usize, Entity)> = q_guests
        .iter()
        .map(|(entity, agent, _)| {
            (
                line.index_of(entity).unwrap_or(usize::MAX),
                agent.arrival(),
                entity,
            )
        })
        .collect();
    order.sort();

    let mut ctx = GuestContext::new(&mut tables, &mut line, &*world_map);

    for (_, _, guest) in order {
        {
            let Ok((_, mut agent, mut transform)) = q_guests.get_mut(guest) else {
                continue;
            };
            let before = agent.state();
            let mut pos = transform.translation.truncate();
            let signal = agent.tick(guest, &mut pos, dt, &mut ctx);
            if pos != transform.translation.truncate() {
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
            }
            report(guest, signal, &mut ev_seated);
            notify_state_change(guest, before, agent.state(), &mut ev_state);
        }

        // 列から抜けた客の後ろを詰める
        for shift in std::mem::take(&mut ctx.shifts) {
            let Ok((_, mut agent, transform)) = q_guests.get_mut(shift.guest) else {
                continue;
            };
            let before = agent.state();
            let signal = agent.apply_shift(shift, transform.translation.truncate(), &mut ctx);
            report(shift.guest, signal, &mut ev_seated);
            notify_state_change(shift.guest, before, agent.state(), &mut ev_state);
        }
    }
}

fn report(
    guest: Entity,
    signal: Option<GuestSignal>,
    ev_seated: &mut MessageWriter<GuestSeatedEvent>,
) {
    match signal {
        Some(GuestSignal::Reserved { table }) => {
            debug!("SEAT: guest {:?} reserved table {:?}", guest, table);
        }
        Some(GuestSignal::Queued { slot }) => {
            debug!("SEAT: guest {:?} waits in line at slot {}", guest, slot);
        }
        Some(GuestSignal::Seated { table, seat }) => {
            info!(
                "SEAT: guest {:?} sat at table {:?} seat {}",
                guest, table, seat.index
            );
            ev_seated.write(GuestSeatedEvent {
                guest,
                table,
                seat_index: seat.index,
            });
        }
        Some(GuestSignal::RaceLost { table }) => {
            info!("SEAT: guest {:?} lost the race for table {:?}", guest, table);
        }
        Some(GuestSignal::TargetLost { table }) => {
            warn!("SEAT: table {:?} vanished under guest {:?}", table, guest);
        }
        Some(GuestSignal::PathBlocked { table }) => {
            warn!("PATH: guest {:?} cannot reach table {:?}", guest, table);
        }
        None => {}
    }
}

fn notify_state_change(
    guest: Entity,
    from: GuestState,
    to: GuestState,
    ev_state: &mut MessageWriter<GuestStateChangedEvent>,
) {
    if from != to {
        ev_state.write(GuestStateChangedEvent { guest, from, to });
    }
}
