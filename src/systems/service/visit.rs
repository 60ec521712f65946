//! 来店サイクル: 着席 → 注文 → 提供 → 飲む → 退店
//!
//! 退店時に席を解放し、その客を狙うタスクを取り消す。
//! 片付けタスクは `GuestDepartedEvent` を受けたタスク生成側が作る。

use crate::config::SimConfig;
use crate::entities::guest::GuestAgent;
use crate::events::{GuestDepartedEvent, GuestSeatedEvent, TaskCompletedEvent};
use crate::systems::seating::TableAvailabilityIndex;
use crate::systems::tasks::{Orchestrator, TaskKind};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VisitPhase {
    /// 席を探している
    #[default]
    Arriving,
    /// 注文を取りに来るのを待っている
    AwaitingOrder,
    /// 注文の品を待っている
    AwaitingDrink,
    Drinking {
        remaining: f32,
    },
}

#[derive(Component, Debug, Clone, Default)]
pub struct GuestVisit {
    phase: VisitPhase,
}

impl GuestVisit {
    pub fn phase(&self) -> VisitPhase {
        self.phase
    }

    pub fn on_seated(&mut self) {
        if self.phase == VisitPhase::Arriving {
            self.phase = VisitPhase::AwaitingOrder;
        }
    }

    pub fn on_order_taken(&mut self) {
        if self.phase == VisitPhase::AwaitingOrder {
            self.phase = VisitPhase::AwaitingDrink;
        }
    }

    pub fn on_served(&mut self, drink_secs: f32) {
        if matches!(
            self.phase,
            VisitPhase::AwaitingOrder | VisitPhase::AwaitingDrink
        ) {
            self.phase = VisitPhase::Drinking {
                remaining: drink_secs.max(0.0),
            };
        }
    }

    /// 飲み終えたら `true`
    pub fn advance(&mut self, dt: f32) -> bool {
        match &mut self.phase {
            VisitPhase::Drinking { remaining } => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            _ => false,
        }
    }
}

pub fn guest_visit_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimConfig>,
    mut tables: ResMut<TableAvailabilityIndex>,
    mut orchestrator: ResMut<Orchestrator>,
    mut q_guests: Query<(Entity, &GuestAgent, &mut GuestVisit)>,
    mut ev_seated: MessageReader<GuestSeatedEvent>,
    mut ev_completed: MessageReader<TaskCompletedEvent>,
    mut ev_departed: MessageWriter<GuestDepartedEvent>,
) {
    for event in ev_seated.read() {
        if let Ok((_, _, mut visit)) = q_guests.get_mut(event.guest) {
            visit.on_seated();
        }
    }

    for event in ev_completed.read() {
        let Ok((_, _, mut visit)) = q_guests.get_mut(event.target) else {
            continue;
        };
        match event.kind {
            TaskKind::TakeOrder => visit.on_order_taken(),
            TaskKind::ServeOrder => visit.on_served(config.drink_secs),
            _ => {}
        }
    }

    let dt = time.delta_secs();
    for (guest, agent, mut visit) in q_guests.iter_mut() {
        if !visit.advance(dt) {
            continue;
        }
        let Some(table) = agent.seated_table() else {
            continue;
        };

        if let Some(t) = tables.get_mut(table) {
            t.release(guest);
        }
        let cancelled = orchestrator.cancel_tasks_for_target(guest);
        info!(
            "VISIT: guest {:?} left table {:?} ({} open tasks cancelled)",
            guest, table, cancelled
        );
        ev_departed.write(GuestDepartedEvent { guest, table });
        commands.entity(guest).despawn();
    }
}
