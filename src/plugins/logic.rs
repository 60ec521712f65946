//! ゲームロジック関連のプラグイン

use crate::entities::guest::systems::guest_spawn_system;
use crate::entities::staff::systems::on_staff_removed;
use crate::systems::GameSystemSet;
use crate::systems::tasks::dispatch::{
    auto_dispatch_system, task_assignment_request_system, task_creation_system,
};
use bevy::prelude::*;

pub struct LogicPlugin;

impl Plugin for LogicPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_staff_removed).add_systems(
            Update,
            (
                guest_spawn_system,
                task_creation_system,
                auto_dispatch_system,
                task_assignment_request_system,
            )
                .chain()
                .in_set(GameSystemSet::Logic),
        );
    }
}
