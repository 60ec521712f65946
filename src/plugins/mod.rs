//! プラグインモジュールのエントリポイント

pub mod actor;
pub mod interface;
pub mod logic;
pub mod messages;
pub mod startup;

pub use actor::ActorPlugin;
pub use interface::InterfacePlugin;
pub use logic::LogicPlugin;
pub use messages::MessagesPlugin;
pub use startup::StartupPlugin;

use crate::systems::GameSystemSet;
use bevy::prelude::*;

/// シミュレーション一式（システムセットの順序 + 各プラグイン）
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GameSystemSet::Logic.run_if(|time: Res<Time<Virtual>>| !time.is_paused()),
                GameSystemSet::Actor.run_if(|time: Res<Time<Virtual>>| !time.is_paused()),
                GameSystemSet::Interface,
            )
                .chain(),
        )
        .add_plugins((
            StartupPlugin,
            MessagesPlugin,
            LogicPlugin,
            ActorPlugin,
            InterfacePlugin,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entities::guest::GuestAgent;
    use crate::events::{GuestDepartedEvent, GuestSeatedEvent, TaskCompletedEvent};
    use crate::interface::task_markers::TaskMarker;
    use crate::systems::seating::{TableAvailabilityIndex, WaitingLine};
    use crate::systems::tasks::{Orchestrator, TaskKind};
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    #[derive(Resource, Default, Debug)]
    struct Tally {
        seated: usize,
        orders_taken: usize,
        served: usize,
        departed: usize,
        cleaned: usize,
    }

    fn tally_system(
        mut tally: ResMut<Tally>,
        mut ev_seated: MessageReader<GuestSeatedEvent>,
        mut ev_completed: MessageReader<TaskCompletedEvent>,
        mut ev_departed: MessageReader<GuestDepartedEvent>,
    ) {
        tally.seated += ev_seated.read().count();
        tally.departed += ev_departed.read().count();
        for event in ev_completed.read() {
            match event.kind {
                TaskKind::TakeOrder => tally.orders_taken += 1,
                TaskKind::ServeOrder => {
                    assert!(event.score.is_some());
                    tally.served += 1;
                }
                TaskKind::CleanTable => tally.cleaned += 1,
            }
        }
    }

    fn headless_app(config: SimConfig) -> App {
        let mut app = App::new();
        app.insert_resource(config)
            .add_plugins(MinimalPlugins)
            .add_plugins(SimulationPlugin)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)))
            .init_resource::<Tally>()
            .add_systems(Update, tally_system.after(GameSystemSet::Interface));
        app
    }

    #[test]
    fn a_full_shift_seats_serves_and_clears_every_guest() {
        let mut app = headless_app(SimConfig {
            max_guests: 6,
            drink_secs: 3.0,
            ..default()
        });

        // 50ms x 4000 = 200秒
        for _ in 0..4000 {
            app.update();
        }

        let tally = app.world().resource::<Tally>();
        assert_eq!(tally.seated, 6, "{tally:?}");
        assert_eq!(tally.orders_taken, 6, "{tally:?}");
        assert_eq!(tally.served, 6, "{tally:?}");
        assert_eq!(tally.departed, 6, "{tally:?}");
        assert!(tally.cleaned >= 1, "{tally:?}");

        let tables = app.world().resource::<TableAvailabilityIndex>();
        assert!(
            tables
                .iter()
                .all(|t| t.seated_count() == 0 && t.reserved_count() == 0)
        );
        assert!(app.world().resource::<WaitingLine>().is_empty());
        assert_eq!(app.world().resource::<Orchestrator>().tasks().count(), 0);

        let mut guests = app.world_mut().query::<&GuestAgent>();
        assert_eq!(guests.iter(app.world()).count(), 0);
        let mut markers = app.world_mut().query::<&TaskMarker>();
        assert_eq!(markers.iter(app.world()).count(), 0);
    }

    #[test]
    fn overflow_guests_wait_in_line_and_never_overbook() {
        // 13席に対して20人、誰も帰らない
        let mut app = headless_app(SimConfig {
            max_guests: 20,
            guest_spawn_interval: 0.2,
            drink_secs: 10_000.0,
            ..default()
        });

        for _ in 0..2000 {
            app.update();
            let tables = app.world().resource::<TableAvailabilityIndex>();
            assert!(
                tables
                    .iter()
                    .all(|t| t.seated_count() + t.reserved_count() <= t.capacity())
            );
        }

        let tables = app.world().resource::<TableAvailabilityIndex>();
        let capacity: usize = tables.iter().map(|t| t.capacity()).sum();
        let seated: usize = tables.iter().map(|t| t.seated_count()).sum();
        assert_eq!(seated, capacity);
        let line = app.world().resource::<WaitingLine>();
        assert_eq!(line.len(), 20 - capacity);
        let indices: Vec<usize> = line
            .guests()
            .iter()
            .filter_map(|&g| line.index_of(g))
            .collect();
        assert_eq!(indices, (0..line.len()).collect::<Vec<_>>());
    }
}
