mod config;
mod constants;
mod entities;
mod events;
mod interface;
mod plugins;
mod relationships;
mod systems;
mod world;

use bevy::app::ScheduleRunnerPlugin;
use bevy::diagnostic::FrameCount;
use bevy::prelude::*;
use std::time::Duration;

use crate::config::SimConfig;
use crate::plugins::SimulationPlugin;

/// シミュレーションの tick レート
const TICKS_PER_SECOND: f64 = 60.0;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICKS_PER_SECOND,
            ))),
        )
        .add_plugins(bevy::log::LogPlugin {
            level: bevy::log::Level::INFO,
            filter: "bar_shift=info".to_string(),
            ..default()
        })
        // LogPlugin の後で読む
        .insert_resource(SimConfig::from_env())
        .add_plugins(SimulationPlugin)
        .add_systems(Last, max_frames_exit_system)
        .run();
}

/// `BAR_SHIFT_MAX_FRAMES` に達したら終了する
fn max_frames_exit_system(
    config: Res<SimConfig>,
    frames: Res<FrameCount>,
    mut exit: MessageWriter<AppExit>,
) {
    if let Some(max_frames) = config.max_frames
        && u64::from(frames.0) >= max_frames
    {
        info!("BOOT: reached {} frames, shutting down", max_frames);
        exit.write(AppExit::Success);
    }
}
