//! 表示層との境界: タスクマーカーと読み取り専用ビュー

pub mod status;
pub mod task_markers;
