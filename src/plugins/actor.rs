//! エージェントの tick を回すプラグイン

use crate::entities::guest::systems::guest_tick_system;
use crate::entities::staff::systems::staff_tick_system;
use crate::systems::GameSystemSet;
use crate::systems::service::{guest_visit_system, order_dialogue_system};
use crate::systems::tasks::lifecycle::task_lifecycle_system;
use bevy::prelude::*;

pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                guest_tick_system,
                staff_tick_system,
                order_dialogue_system,
                guest_visit_system,
                // 客・スタッフが起こした完了/取り消しをまとめて通知する
                task_lifecycle_system,
            )
                .chain()
                .in_set(GameSystemSet::Actor),
        );
    }
}
