//! シミュレーション設定
//!
//! 既定値は `constants` から取り、`BAR_SHIFT_*` 環境変数で上書きできる。
//! 解釈できない値は警告を出して既定値のまま使う。

use crate::constants::*;
use bevy::prelude::*;
use std::str::FromStr;

/// 実行時設定
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct SimConfig {
    /// 乱数シード（来店間隔の揺らぎ・採点）
    pub seed: u64,
    /// 来店する客の総数
    pub max_guests: usize,
    pub staff_count: usize,
    /// スタッフごとのタスクキュー上限
    pub task_queue_bound: usize,
    pub guest_spawn_interval: f32,
    pub order_dialogue_secs: f32,
    pub drink_secs: f32,
    /// 未割り当てタスクを自動でスタッフに振るか
    pub auto_dispatch: bool,
    /// 指定フレーム数で終了する（None なら無限）
    pub max_frames: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            max_guests: DEFAULT_MAX_GUESTS,
            staff_count: DEFAULT_STAFF_COUNT,
            task_queue_bound: TASK_QUEUE_BOUND,
            guest_spawn_interval: GUEST_SPAWN_INTERVAL_SECS,
            order_dialogue_secs: ORDER_DIALOGUE_SECS,
            drink_secs: DRINK_DURATION_SECS,
            auto_dispatch: true,
            max_frames: None,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる（テストでは HashMap などを渡す）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        override_with(&lookup, "BAR_SHIFT_SEED", &mut config.seed);
        override_with(&lookup, "BAR_SHIFT_GUESTS", &mut config.max_guests);
        override_with(&lookup, "BAR_SHIFT_STAFF", &mut config.staff_count);
        override_with(&lookup, "BAR_SHIFT_QUEUE_BOUND", &mut config.task_queue_bound);
        override_with(&lookup, "BAR_SHIFT_SPAWN_INTERVAL", &mut config.guest_spawn_interval);
        override_with(&lookup, "BAR_SHIFT_ORDER_SECS", &mut config.order_dialogue_secs);
        override_with(&lookup, "BAR_SHIFT_DRINK_SECS", &mut config.drink_secs);
        override_with(&lookup, "BAR_SHIFT_AUTO_DISPATCH", &mut config.auto_dispatch);

        let mut max_frames = 0u64;
        override_with(&lookup, "BAR_SHIFT_MAX_FRAMES", &mut max_frames);
        if max_frames > 0 {
            config.max_frames = Some(max_frames);
        }

        // キュー上限 0 ではどのタスクも受理できない
        if config.task_queue_bound == 0 {
            warn!("CONFIG: BAR_SHIFT_QUEUE_BOUND must be >= 1, using {}", TASK_QUEUE_BOUND);
            config.task_queue_bound = TASK_QUEUE_BOUND;
        }
        config
    }
}

fn override_with<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => warn!("CONFIG: ignoring invalid value {:?} for {}", raw, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        let config = SimConfig::from_lookup(|_| None);
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.task_queue_bound, TASK_QUEUE_BOUND);
    }

    #[test]
    fn overrides_are_applied() {
        let config = SimConfig::from_lookup(lookup_from(&[
            ("BAR_SHIFT_SEED", "42"),
            ("BAR_SHIFT_STAFF", "3"),
            ("BAR_SHIFT_AUTO_DISPATCH", "false"),
            ("BAR_SHIFT_MAX_FRAMES", "600"),
            ("BAR_SHIFT_DRINK_SECS", " 4.5 "),
        ]));
        assert_eq!(config.seed, 42);
        assert_eq!(config.staff_count, 3);
        assert!(!config.auto_dispatch);
        assert_eq!(config.max_frames, Some(600));
        assert_eq!(config.drink_secs, 4.5);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = SimConfig::from_lookup(lookup_from(&[
            ("BAR_SHIFT_GUESTS", "many"),
            ("BAR_SHIFT_QUEUE_BOUND", "0"),
        ]));
        assert_eq!(config.max_guests, DEFAULT_MAX_GUESTS);
        assert_eq!(config.task_queue_bound, TASK_QUEUE_BOUND);
    }
}
