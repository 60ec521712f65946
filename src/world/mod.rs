//! ワールド（グリッドマップ・経路探索）

pub mod map;
pub mod navigator;
pub mod pathfinding;

pub use map::WorldMap;
pub use navigator::{GridNavigator, GridPos};
