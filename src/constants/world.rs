//! ワールド (グリッド) 定数

pub const TILE_SIZE: f32 = 32.0;
pub const MAP_WIDTH: i32 = 24;
pub const MAP_HEIGHT: i32 = 16;

/// 1フレームあたりの経路探索ノード展開上限（到達不能ゴールで探索が暴走しないように）
pub const PATHFINDING_MAX_EXPANSIONS: usize = 4096;
