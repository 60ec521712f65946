//! テーブル: 座席 + 予約
//!
//! 予約は「テーブルに向かって歩いている客」の枠取り。到着時に着席へ変換されるか、
//! 明示的にキャンセルされるまで残る。予約数の増減はこの型のメソッドだけが行う。

use super::seat_registry::{SeatClaim, SeatFacing, SeatRegistry};
use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SeatingError {
    #[error("table has no room left")]
    NoRoom,
    #[error("reserved seat was taken before arrival")]
    RaceLost,
    #[error("table {0} no longer exists")]
    InvalidTarget(Entity),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    entity: Entity,
    anchor: Vec2,
    seats: SeatRegistry,
    reservations: Vec<Entity>,
}

impl Table {
    pub fn new(entity: Entity, anchor: Vec2, capacity: usize, single_facing: SeatFacing) -> Self {
        Self {
            entity,
            anchor,
            seats: SeatRegistry::new(anchor, capacity, single_facing),
            reservations: Vec::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn capacity(&self) -> usize {
        self.seats.capacity()
    }

    pub fn seated_count(&self) -> usize {
        self.seats.occupied_count()
    }

    pub fn reserved_count(&self) -> usize {
        self.reservations.len()
    }

    pub fn seats(&self) -> &SeatRegistry {
        &self.seats
    }

    /// 予約・着席のどちらにも使われていない枠があるか
    pub fn has_room(&self) -> bool {
        self.seated_count() + self.reserved_count() < self.capacity()
    }

    pub fn is_reserved_by(&self, guest: Entity) -> bool {
        self.reservations.contains(&guest)
    }

    /// 予約を作る。既に予約済みなら成功扱い
    pub fn reserve(&mut self, guest: Entity) -> Result<(), SeatingError> {
        if self.is_reserved_by(guest) {
            return Ok(());
        }
        if !self.has_room() {
            return Err(SeatingError::NoRoom);
        }
        self.reservations.push(guest);
        Ok(())
    }

    pub fn cancel_reservation(&mut self, guest: Entity) -> bool {
        let before = self.reservations.len();
        self.reservations.retain(|&g| g != guest);
        self.reservations.len() != before
    }

    /// 到着した予約客を着席させる。
    ///
    /// 歩いている間に席が埋まっていれば予約を取り消して `RaceLost` を返す。
    /// 成功時は予約が着席に変換される。
    pub fn seat_reserved_guest(&mut self, guest: Entity) -> Result<SeatClaim, SeatingError> {
        if let Some(existing) = self.seats.seat_of(guest) {
            self.cancel_reservation(guest);
            return Ok(existing);
        }
        if self.seated_count() >= self.capacity() {
            self.cancel_reservation(guest);
            return Err(SeatingError::RaceLost);
        }
        match self.seats.find_seat_for_guest(guest) {
            Some(claim) => {
                self.cancel_reservation(guest);
                Ok(claim)
            }
            None => {
                self.cancel_reservation(guest);
                Err(SeatingError::RaceLost)
            }
        }
    }

    /// 予約を経由しない直接の座席確保
    pub fn find_seat_for_guest(&mut self, guest: Entity) -> Option<SeatClaim> {
        self.seats.find_seat_for_guest(guest)
    }

    /// 着席中の客を立たせる（予約があればそれも消す）
    pub fn release(&mut self, guest: Entity) -> bool {
        let released = self.seats.release(guest);
        let cancelled = self.cancel_reservation(guest);
        released || cancelled
    }

    pub fn is_seat_assigned_to(&self, seat_index: usize, guest: Entity) -> bool {
        self.seats.is_assigned_to(seat_index, guest)
    }

    pub(super) fn take_reservations(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.reservations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(capacity: usize, guests: usize) -> (Table, Vec<Entity>) {
        let mut world = World::new();
        let table = world.spawn_empty().id();
        let g = (0..guests).map(|_| world.spawn_empty().id()).collect();
        (
            Table::new(table, Vec2::ZERO, capacity, SeatFacing::Bottom),
            g,
        )
    }

    fn invariant_holds(table: &Table) -> bool {
        table.seated_count() + table.reserved_count() <= table.capacity()
    }

    #[test]
    fn reservations_are_bounded_by_capacity() {
        let (mut table, g) = setup(2, 3);
        assert_eq!(table.reserve(g[0]), Ok(()));
        assert_eq!(table.reserve(g[0]), Ok(()));
        assert_eq!(table.reserve(g[1]), Ok(()));
        assert_eq!(table.reserved_count(), 2);
        assert_eq!(table.reserve(g[2]), Err(SeatingError::NoRoom));
        assert!(invariant_holds(&table));
    }

    #[test]
    fn arrival_converts_reservation_into_occupancy() {
        let (mut table, g) = setup(2, 1);
        table.reserve(g[0]).expect("room");
        let claim = table.seat_reserved_guest(g[0]).expect("seat");
        assert_eq!(claim.index, 0);
        assert_eq!(table.seated_count(), 1);
        assert_eq!(table.reserved_count(), 0);
        assert!(invariant_holds(&table));
    }

    #[test]
    fn arrival_after_seat_was_taken_is_race_lost() {
        let (mut table, g) = setup(1, 2);
        table.reserve(g[0]).expect("room");
        // 予約を経由しない客が先に座ってしまう
        assert!(table.find_seat_for_guest(g[1]).is_some());

        assert_eq!(table.seat_reserved_guest(g[0]), Err(SeatingError::RaceLost));
        assert_eq!(table.reserved_count(), 0);
        assert_eq!(table.seated_count(), 1);
        assert!(invariant_holds(&table));
    }

    #[test]
    fn release_clears_seat_and_reservation() {
        let (mut table, g) = setup(2, 2);
        table.reserve(g[0]).expect("room");
        table.seat_reserved_guest(g[0]).expect("seat");
        table.reserve(g[1]).expect("room");
        assert!(table.release(g[0]));
        assert!(table.release(g[1]));
        assert!(!table.release(g[1]));
        assert_eq!(table.seated_count() + table.reserved_count(), 0);
    }

    #[test]
    fn seat_assignment_follows_the_occupant() {
        let (mut table, g) = setup(2, 2);
        table.reserve(g[0]).expect("room");
        let claim = table.seat_reserved_guest(g[0]).expect("seat");
        assert!(table.is_seat_assigned_to(claim.index, g[0]));
        assert!(!table.is_seat_assigned_to(claim.index, g[1]));
        table.release(g[0]);
        assert!(!table.is_seat_assigned_to(claim.index, g[0]));
    }
}
