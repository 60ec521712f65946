//! 提供結果の採点
//!
//! 採点アルゴリズム自体は外部のもので、ここでは中身を知らずに点数だけ受け取る。

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 採点の最高点
pub const MAX_ORDER_SCORE: u32 = 100;

pub trait OrderScorer: Send + Sync + 'static {
    /// `guest` への提供を採点する
    fn score(&mut self, guest: Entity) -> u32;
}

/// シード付き乱数で点数を出す既定の採点者
#[derive(Debug, Clone)]
pub struct SeededOrderScorer {
    rng: StdRng,
}

impl SeededOrderScorer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl OrderScorer for SeededOrderScorer {
    fn score(&mut self, _guest: Entity) -> u32 {
        self.rng.gen_range(40..=MAX_ORDER_SCORE)
    }
}

#[derive(Resource)]
pub struct OrderScoring {
    scorer: Box<dyn OrderScorer>,
}

impl OrderScoring {
    pub fn new(scorer: impl OrderScorer) -> Self {
        Self {
            scorer: Box::new(scorer),
        }
    }

    pub fn score(&mut self, guest: Entity) -> u32 {
        self.scorer.score(guest).min(MAX_ORDER_SCORE)
    }
}

impl Default for OrderScoring {
    fn default() -> Self {
        Self::new(SeededOrderScorer::new(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl OrderScorer for Fixed {
        fn score(&mut self, _guest: Entity) -> u32 {
            self.0
        }
    }

    #[test]
    fn same_seed_gives_same_scores() {
        let guest = World::new().spawn_empty().id();
        let mut a = OrderScoring::new(SeededOrderScorer::new(42));
        let mut b = OrderScoring::new(SeededOrderScorer::new(42));
        let left: Vec<u32> = (0..8).map(|_| a.score(guest)).collect();
        let right: Vec<u32> = (0..8).map(|_| b.score(guest)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|&s| (40..=MAX_ORDER_SCORE).contains(&s)));
    }

    #[test]
    fn external_scores_are_clamped() {
        let guest = World::new().spawn_empty().id();
        let mut scoring = OrderScoring::new(Fixed(250));
        assert_eq!(scoring.score(guest), MAX_ORDER_SCORE);
    }
}
