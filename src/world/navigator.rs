//! グリッドナビゲーションの抽象
//!
//! エージェントの状態機械はこの trait だけを通して経路を得る。
//! 既定の実装は [`WorldMap`](super::WorldMap) + A*。

use bevy::prelude::*;

/// グリッド座標 (x, y)
pub type GridPos = (i32, i32);

pub trait GridNavigator {
    /// ワールド座標 → グリッド座標
    fn cell_of(&self, pos: Vec2) -> GridPos;
    /// グリッド座標 → セル中心のワールド座標
    fn world_of(&self, cell: GridPos) -> Vec2;
    /// `start` から `goal` までのセル列（両端を含む）。到達不能なら `None`
    fn find_path(&self, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>>;
}
