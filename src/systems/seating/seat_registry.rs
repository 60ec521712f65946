//! テーブル1卓分の座席管理
//!
//! 座席は定員から決定的に生成され、各席は高々1人の客を弱参照（`Entity`）で保持する。
//! 客のライフサイクルはここでは管理しない。

use crate::constants::{MAX_TABLE_CAPACITY, TILE_SIZE};
use bevy::prelude::*;

/// 1席テーブルの椅子が置かれる向き
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub enum SeatFacing {
    Left,
    Right,
    Top,
    #[default]
    Bottom,
}

impl SeatFacing {
    /// テーブル中心からの相対オフセット（ワールド座標）
    pub fn offset(self) -> Vec2 {
        match self {
            SeatFacing::Left => Vec2::new(-TILE_SIZE, 0.0),
            SeatFacing::Right => Vec2::new(TILE_SIZE, 0.0),
            SeatFacing::Top => Vec2::new(0.0, TILE_SIZE),
            SeatFacing::Bottom => Vec2::new(0.0, -TILE_SIZE),
        }
    }
}

/// 定員ごとの座席配置
///
/// - 1席: 設定された向き
/// - 2席: 左右
/// - 3席: 左右下
/// - 4席以上: 左右上下
pub fn seat_layout(capacity: usize, single_facing: SeatFacing) -> Vec<SeatFacing> {
    match capacity.clamp(1, MAX_TABLE_CAPACITY) {
        1 => vec![single_facing],
        2 => vec![SeatFacing::Left, SeatFacing::Right],
        3 => vec![SeatFacing::Left, SeatFacing::Right, SeatFacing::Bottom],
        _ => vec![
            SeatFacing::Left,
            SeatFacing::Right,
            SeatFacing::Top,
            SeatFacing::Bottom,
        ],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    index: usize,
    anchor: Vec2,
    occupant: Option<Entity>,
}

impl Seat {
    pub fn occupant(&self) -> Option<Entity> {
        self.occupant
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// 座席確保の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatClaim {
    pub index: usize,
    pub anchor: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatRegistry {
    single_facing: SeatFacing,
    seats: Vec<Seat>,
}

impl SeatRegistry {
    pub fn new(table_anchor: Vec2, capacity: usize, single_facing: SeatFacing) -> Self {
        let mut registry = Self {
            single_facing,
            seats: Vec::new(),
        };
        registry.regenerate(table_anchor, capacity);
        registry
    }

    /// 座席を作り直す。全ての割り当ては消え、追い出された客を返す
    pub fn regenerate(&mut self, table_anchor: Vec2, capacity: usize) -> Vec<Entity> {
        let displaced = self.seats.iter().filter_map(|s| s.occupant).collect();
        self.seats = seat_layout(capacity, self.single_facing)
            .into_iter()
            .enumerate()
            .map(|(index, facing)| Seat {
                index,
                anchor: table_anchor + facing.offset(),
                occupant: None,
            })
            .collect();
        displaced
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn capacity(&self) -> usize {
        self.seats.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|s| !s.is_free()).count()
    }

    pub fn seat_of(&self, guest: Entity) -> Option<SeatClaim> {
        self.seats
            .iter()
            .find(|s| s.occupant == Some(guest))
            .map(|s| SeatClaim {
                index: s.index,
                anchor: s.anchor,
            })
    }

    /// 既に座っていればその席を返す。そうでなければ宣言順で最初の空席を確保する
    pub fn find_seat_for_guest(&mut self, guest: Entity) -> Option<SeatClaim> {
        if let Some(existing) = self.seat_of(guest) {
            return Some(existing);
        }
        let seat = self.seats.iter_mut().find(|s| s.is_free())?;
        seat.occupant = Some(guest);
        Some(SeatClaim {
            index: seat.index,
            anchor: seat.anchor,
        })
    }

    /// 客の座席を解放する。座っていなければ何もしない
    pub fn release(&mut self, guest: Entity) -> bool {
        match self.seats.iter_mut().find(|s| s.occupant == Some(guest)) {
            Some(seat) => {
                seat.occupant = None;
                true
            }
            None => false,
        }
    }

    pub fn is_assigned_to(&self, seat_index: usize, guest: Entity) -> bool {
        self.seats
            .get(seat_index)
            .is_some_and(|s| s.occupant == Some(guest))
    }
}
