//! インターフェース関連のプラグイン

use crate::interface::status::{ShiftStats, bar_status_log_system, shift_stats_system};
use crate::interface::task_markers::{
    on_task_assigned, on_task_cancelled, on_task_completed, on_task_unassigned,
    task_marker_follow_system,
};
use crate::systems::GameSystemSet;
use bevy::prelude::*;

pub struct InterfacePlugin;

impl Plugin for InterfacePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShiftStats>()
            .add_observer(on_task_assigned)
            .add_observer(on_task_unassigned)
            .add_observer(on_task_completed)
            .add_observer(on_task_cancelled)
            .add_systems(
                Update,
                (task_marker_follow_system, shift_stats_system, bar_status_log_system)
                    .chain()
                    .in_set(GameSystemSet::Interface),
            );
    }
}
