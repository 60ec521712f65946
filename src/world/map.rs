//! ワールドマップと座標変換API

use super::navigator::{GridNavigator, GridPos};
use super::pathfinding;
use crate::constants::*;
use bevy::prelude::*;

/// 店内の通行可否グリッド
///
/// 原点はマップ中央。テーブルなどの設置物は障害物として登録される。
#[derive(Resource, Debug, Clone)]
pub struct WorldMap {
    width: i32,
    height: i32,
    tile_size: f32,
    obstacles: Vec<bool>,
}

impl Default for WorldMap {
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT)
    }
}

impl WorldMap {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tile_size: TILE_SIZE,
            obstacles: vec![false; size],
        }
    }

    #[inline(always)]
    pub fn pos_to_idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        match self.pos_to_idx(x, y) {
            Some(idx) => !self.obstacles[idx],
            None => false,
        }
    }

    pub fn add_obstacle(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.pos_to_idx(x, y) {
            self.obstacles[idx] = true;
        }
    }

    pub fn world_to_grid(&self, pos: Vec2) -> GridPos {
        let x = (pos.x / self.tile_size + (self.width as f32 - 1.0) / 2.0 + 0.5).floor() as i32;
        let y = (pos.y / self.tile_size + (self.height as f32 - 1.0) / 2.0 + 0.5).floor() as i32;
        (x, y)
    }

    pub fn grid_to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            (x as f32 - (self.width as f32 - 1.0) / 2.0) * self.tile_size,
            (y as f32 - (self.height as f32 - 1.0) / 2.0) * self.tile_size,
        )
    }

    /// `pos` に最も近い通行可能セル（半径5マスまで）
    pub fn nearest_walkable_grid(&self, pos: Vec2) -> Option<GridPos> {
        let grid = self.world_to_grid(pos);
        if self.is_walkable(grid.0, grid.1) {
            return Some(grid);
        }
        for r in 1..=5 {
            for dx in -r..=r {
                for dy in -r..=r {
                    let test = (grid.0 + dx, grid.1 + dy);
                    if self.is_walkable(test.0, test.1) {
                        return Some(test);
                    }
                }
            }
        }
        None
    }
}

impl GridNavigator for WorldMap {
    fn cell_of(&self, pos: Vec2) -> GridPos {
        self.world_to_grid(pos)
    }

    fn world_of(&self, cell: GridPos) -> Vec2 {
        self.grid_to_world(cell.0, cell.1)
    }

    /// ゴールが障害物（テーブル等）なら隣接マスまでの経路を返す
    fn find_path(&self, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
        if self.is_walkable(goal.0, goal.1) {
            pathfinding::find_path(self, start, goal)
        } else {
            pathfinding::find_path_to_adjacent(self, start, goal)
        }
    }
}
