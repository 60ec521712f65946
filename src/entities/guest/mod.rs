//! 客（ゲスト）エージェント
//!
//! 客は席を探し、テーブルへ歩き、着席する。空席がなければ待機列に並び、
//! 並んでいる間も毎tick空席を探し続ける。

mod state_machine;
pub mod systems;

pub use state_machine::{GuestContext, GuestSignal};

use crate::entities::movement::Path;
use crate::systems::seating::SeatClaim;
use bevy::prelude::*;

/// 客の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub enum GuestState {
    /// 行き先（テーブル or 待機列）を決める
    #[default]
    SeekingTarget,
    Walking,
    /// 待機列で立っている
    Waiting,
    /// 着席済み（以後、行き先の評価はしない）
    Seated,
}

/// 客の行き先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestTarget {
    Table(Entity),
    WaitingSlot(usize),
}

#[derive(Component, Debug, Clone)]
pub struct GuestAgent {
    /// 来店番号（先着順の判定に使う）
    arrival: usize,
    state: GuestState,
    target: Option<GuestTarget>,
    waiting_slot: Option<usize>,
    seat: Option<SeatClaim>,
    path: Path,
    speed: f32,
    retry_cooldown: u8,
    /// 立ち位置へ行けなかったときの再計画までの残りtick
    slot_retry: Option<u8>,
}

impl GuestAgent {
    pub fn new(speed: f32, arrival: usize) -> Self {
        Self {
            arrival,
            state: GuestState::SeekingTarget,
            target: None,
            waiting_slot: None,
            seat: None,
            path: Path::default(),
            speed,
            retry_cooldown: 0,
            slot_retry: None,
        }
    }

    pub fn arrival(&self) -> usize {
        self.arrival
    }

    pub fn state(&self) -> GuestState {
        self.state
    }

    pub fn target(&self) -> Option<GuestTarget> {
        self.target
    }

    pub fn waiting_slot(&self) -> Option<usize> {
        self.waiting_slot
    }

    pub fn seat(&self) -> Option<SeatClaim> {
        self.seat
    }

    /// 着席しているテーブル
    pub fn seated_table(&self) -> Option<Entity> {
        match (self.state, self.target) {
            (GuestState::Seated, Some(GuestTarget::Table(table))) => Some(table),
            _ => None,
        }
    }
}
