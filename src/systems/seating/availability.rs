//! 空席テーブルの検索
//!
//! 全テーブルを宣言順で保持し、「最初に条件を満たしたもの」を返す。
//! 同じ入力なら常に同じテーブルが選ばれる。

use super::table::{SeatingError, Table};
use bevy::prelude::*;

#[derive(Resource, Debug, Default, Clone)]
pub struct TableAvailabilityIndex {
    tables: Vec<Table>,
}

impl TableAvailabilityIndex {
    /// テーブルを末尾に登録する（登録順が優先順）
    pub fn register(&mut self, table: Table) {
        if self.get(table.entity()).is_some() {
            warn!("SEAT: table {:?} registered twice, ignoring", table.entity());
            return;
        }
        self.tables.push(table);
    }

    /// テーブルを撤去する。そのテーブルに予約していた客を返す
    pub fn remove(&mut self, entity: Entity) -> Option<(Table, Vec<Entity>)> {
        let idx = self.tables.iter().position(|t| t.entity() == entity)?;
        let mut table = self.tables.remove(idx);
        let reserved = table.take_reservations();
        Some((table, reserved))
    }

    pub fn get(&self, entity: Entity) -> Option<&Table> {
        self.tables.iter().find(|t| t.entity() == entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.entity() == entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn first_with_room(&self, partially_occupied: bool, skip: &[Entity]) -> Option<Entity> {
        self.tables
            .iter()
            .filter(|t| !skip.contains(&t.entity()))
            .find(|t| t.has_room() && (!partially_occupied || t.seated_count() >= 1))
            .map(Table::entity)
    }

    /// 既に誰かが座っていて、まだ枠が残っているテーブル（新しい卓を開けるより優先）
    pub fn partially_occupied_table_with_room(&self, skip: &[Entity]) -> Option<Entity> {
        self.first_with_room(true, skip)
    }

    /// 空席のあるテーブル（空卓を含む）
    pub fn any_table_with_room(&self, skip: &[Entity]) -> Option<Entity> {
        self.first_with_room(false, skip)
    }

    /// 優先順でテーブルを選び、その場で予約まで行う。`skip` のテーブルは候補にしない
    pub fn claim_table(&mut self, guest: Entity, skip: &[Entity]) -> Option<Entity> {
        if let Some(existing) = self
            .tables
            .iter()
            .find(|t| t.is_reserved_by(guest) && !skip.contains(&t.entity()))
        {
            return Some(existing.entity());
        }
        let entity = self
            .partially_occupied_table_with_room(skip)
            .or_else(|| self.any_table_with_room(skip))?;
        self.reserve(entity, guest).ok().map(|()| entity)
    }

    pub fn reserve(&mut self, table: Entity, guest: Entity) -> Result<(), SeatingError> {
        self.get_mut(table)
            .ok_or(SeatingError::InvalidTarget(table))?
            .reserve(guest)
    }

    pub fn cancel_reservation(&mut self, table: Entity, guest: Entity) -> bool {
        self.get_mut(table)
            .is_some_and(|t| t.cancel_reservation(guest))
    }

    /// 到着時の着席処理（再検証込み）
    pub fn seat_reserved_guest(
        &mut self,
        table: Entity,
        guest: Entity,
    ) -> Result<super::SeatClaim, SeatingError> {
        self.get_mut(table)
            .ok_or(SeatingError::InvalidTarget(table))?
            .seat_reserved_guest(guest)
    }
}
