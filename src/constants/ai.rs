//! エージェント AI 定数 (移動・再試行・タスク)

use super::world::TILE_SIZE;

// ----- 移動 (Locomotion) -----
pub const GUEST_SPEED: f32 = TILE_SIZE * 2.5;
pub const STAFF_SPEED: f32 = TILE_SIZE * 3.5;
/// waypoint 到着判定の距離
pub const ARRIVAL_EPSILON: f32 = 0.5;

// ----- 再試行 -----
/// 経路が見つからなかった客が再探索するまでのフレーム数
pub const PATHFINDING_RETRY_COOLDOWN_FRAMES: u8 = 10;

// ----- タスク -----
/// スタッフ1人あたりのタスクキュー上限（current を含む）
pub const TASK_QUEUE_BOUND: usize = 3;
/// 注文ダイアログの既定所要時間（秒）
pub const ORDER_DIALOGUE_SECS: f32 = 2.0;
/// 提供後に客が飲み終えて退店するまでの既定時間（秒）
pub const DRINK_DURATION_SECS: f32 = 12.0;
