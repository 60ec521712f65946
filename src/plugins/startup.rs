//! スタートアップ関連のプラグイン

use crate::config::SimConfig;
use crate::constants::*;
use crate::entities::guest::systems::GuestSpawner;
use crate::entities::staff::systems::spawn_staff;
use crate::entities::table::spawn_tables;
use crate::systems::seating::{TableAvailabilityIndex, WaitingLine};
use crate::systems::service::{OrderDialogues, OrderScoring, SeededOrderScorer};
use crate::systems::tasks::Orchestrator;
use crate::world::WorldMap;
use bevy::prelude::*;

pub struct StartupPlugin;

impl Plugin for StartupPlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<SimConfig>()
            .init_resource::<WorldMap>()
            .init_resource::<TableAvailabilityIndex>()
            .init_resource::<Orchestrator>()
            .init_resource::<OrderDialogues>()
            .register_type::<SimConfig>()
            // Startup systems
            .add_systems(Startup, setup_bar);
    }
}

fn setup_bar(
    mut commands: Commands,
    config: Res<SimConfig>,
    mut world_map: ResMut<WorldMap>,
    mut tables: ResMut<TableAvailabilityIndex>,
    mut orchestrator: ResMut<Orchestrator>,
) {
    info!("BOOT: {:?}", *config);

    spawn_tables(&mut commands, &mut world_map, &mut tables);
    spawn_staff(
        &mut commands,
        &world_map,
        &mut orchestrator,
        config.staff_count,
        config.task_queue_bound,
    );

    let base = world_map.grid_to_world(WAITING_LINE_BASE_GRID.0, WAITING_LINE_BASE_GRID.1);
    commands.insert_resource(WaitingLine::new(
        base,
        WAITING_LINE_SPACING_TILES * TILE_SIZE,
        WAITING_LINE_DIRECTION,
    ));
    commands.insert_resource(GuestSpawner::new(config.seed, config.guest_spawn_interval));
    // 採点は来店の揺らぎと別系列の乱数にする
    commands.insert_resource(OrderScoring::new(SeededOrderScorer::new(
        config.seed.wrapping_add(1),
    )));

    info!(
        "BOOT: {} tables, {} staff, up to {} guests",
        tables.len(),
        config.staff_count,
        config.max_guests
    );
}
