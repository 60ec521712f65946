//! Z軸レイヤー管理 (プレゼンテーション層が読む値)

/// テーブル
pub const Z_TABLE: f32 = 0.5;
/// 客・スタッフ
pub const Z_CHARACTER: f32 = 1.0;
/// タスクマーカー（ターゲットやスタッフの頭上）
pub const Z_TASK_MARKER: f32 = 2.0;
/// マーカーを頭上に出すときのオフセット
pub const TASK_MARKER_OFFSET_Y: f32 = 20.0;
