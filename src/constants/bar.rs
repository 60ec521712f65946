//! 店内レイアウト定数

use crate::systems::seating::{LineDirection, SeatFacing};

/// テーブル1卓あたりの最大席数
pub const MAX_TABLE_CAPACITY: usize = 4;

/// テーブル配置 (グリッド座標, 定員, 1席テーブルの向き)。宣言順がテーブルの優先順になる
pub const TABLE_LAYOUT: &[((i32, i32), usize, SeatFacing)] = &[
    ((6, 11), 2, SeatFacing::Bottom),
    ((11, 11), 4, SeatFacing::Bottom),
    ((16, 11), 3, SeatFacing::Bottom),
    ((6, 6), 1, SeatFacing::Right),
    ((11, 6), 2, SeatFacing::Bottom),
    ((16, 6), 1, SeatFacing::Left),
];

/// 入口（客のスポーン地点）
pub const ENTRANCE_GRID: (i32, i32) = (1, 1);
/// スタッフの初期位置（カウンター前）
pub const STAFF_HOME_GRID: (i32, i32) = (20, 2);

/// 待機列の先頭位置
pub const WAITING_LINE_BASE_GRID: (i32, i32) = (3, 3);
/// 待機列の間隔（タイル単位）
pub const WAITING_LINE_SPACING_TILES: f32 = 0.8;
pub const WAITING_LINE_DIRECTION: LineDirection = LineDirection::UpRight;

// ----- 既定の人数 -----
pub const DEFAULT_STAFF_COUNT: usize = 2;
pub const DEFAULT_MAX_GUESTS: usize = 16;
/// 客の来店間隔（秒）
pub const GUEST_SPAWN_INTERVAL_SECS: f32 = 1.5;
/// 状況ログの出力間隔（秒）
pub const STATUS_LOG_INTERVAL_SECS: f32 = 5.0;
