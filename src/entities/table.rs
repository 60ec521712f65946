//! テーブルエンティティ

use crate::constants::{TABLE_LAYOUT, Z_TABLE};
use crate::systems::seating::{Table, TableAvailabilityIndex};
use crate::world::WorldMap;
use bevy::prelude::*;

/// テーブル（席の状態は `TableAvailabilityIndex` 側が持つ）
#[derive(Component, Debug, Clone, Copy)]
pub struct BarTable;

/// `TABLE_LAYOUT` の順にテーブルを置き、通行不可にして空席検索に登録する
pub fn spawn_tables(
    commands: &mut Commands,
    world_map: &mut WorldMap,
    tables: &mut TableAvailabilityIndex,
) -> Vec<Entity> {
    TABLE_LAYOUT
        .iter()
        .enumerate()
        .map(|(i, &(grid, capacity, facing))| {
            let anchor = world_map.grid_to_world(grid.0, grid.1);
            let entity = commands
                .spawn((
                    BarTable,
                    Name::new(format!("Table {}", i + 1)),
                    Transform::from_xyz(anchor.x, anchor.y, Z_TABLE),
                ))
                .id();
            world_map.add_obstacle(grid.0, grid.1);
            tables.register(Table::new(entity, anchor, capacity, facing));
            info!("SPAWN: table {:?} at {:?} ({} seats)", entity, grid, capacity);
            entity
        })
        .collect()
}
