pub mod seating;
pub mod service;
pub mod tasks;

use bevy::prelude::*;

/// ゲームシステムの実行順序を制御するセット
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSystemSet {
    /// 来店・タスク生成・配車などのコアロジック
    Logic,
    /// 客とスタッフの tick（移動・着席・タスク実行）
    Actor,
    /// タスクマーカー・状況ログ (Actor の結果を読むだけ)
    Interface,
}
