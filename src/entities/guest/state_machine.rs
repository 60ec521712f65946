//! 客の状態機械
//!
//! `SeekingTarget → Walking → (Waiting → Walking →) Seated`
//!
//! - 予約は行き先を決めた瞬間に取る（到着時ではない）
//! - 到着時に席を再検証し、埋まっていれば予約を返して `SeekingTarget` に戻る
//! - 列にいる客は毎tick空席を探す
//! - 経路のないテーブルは飛ばして次のテーブルを試す。全滅なら列に並ぶ

use super::{GuestAgent, GuestState, GuestTarget};
use crate::constants::{ARRIVAL_EPSILON, PATHFINDING_RETRY_COOLDOWN_FRAMES};
use crate::entities::movement::{Path, StepResult, follow_path};
use crate::systems::seating::{
    SeatClaim, SeatingError, SlotShift, TableAvailabilityIndex, WaitingLine,
};
use crate::world::GridNavigator;
use bevy::prelude::*;

/// 1tick の間に客が触れる共有状態
pub struct GuestContext<'a, N: GridNavigator> {
    pub tables: &'a mut TableAvailabilityIndex,
    pub line: &'a mut WaitingLine,
    pub nav: &'a N,
    /// 列から抜けた客がいたときに詰められた客（呼び出し側が `apply_shift` で配る）
    pub shifts: Vec<SlotShift>,
}

impl<'a, N: GridNavigator> GuestContext<'a, N> {
    pub fn new(tables: &'a mut TableAvailabilityIndex, line: &'a mut WaitingLine, nav: &'a N) -> Self {
        Self {
            tables,
            line,
            nav,
            shifts: Vec::new(),
        }
    }
}

/// tick の結果起きた出来事
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuestSignal {
    Reserved { table: Entity },
    Queued { slot: usize },
    Seated { table: Entity, seat: SeatClaim },
    /// 到着したら席が埋まっていた
    RaceLost { table: Entity },
    /// 向かっていた（座っていた）テーブルが消えた
    TargetLost { table: Entity },
    /// 空きのあるテーブルにどれも経路がない
    PathBlocked { table: Entity },
}

impl GuestAgent {
    pub fn tick<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: &mut Vec2,
        dt: f32,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        match self.state {
            GuestState::Seated => self.stay_seated(me, ctx),
            GuestState::SeekingTarget => self.seek(me, *position, ctx),
            GuestState::Waiting => self.wait_in_line(me, *position, ctx),
            GuestState::Walking => self.walk(me, position, dt, ctx),
        }
    }

    /// 列が詰められたとき、新しい立ち位置へ向かい直す
    pub fn apply_shift<N: GridNavigator>(
        &mut self,
        shift: SlotShift,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        if self.waiting_slot.is_none() || self.waiting_slot == Some(shift.new_index) {
            return None;
        }
        self.waiting_slot = Some(shift.new_index);
        self.head_to_slot(shift.new_index, shift.position, position, ctx);
        Some(GuestSignal::Queued {
            slot: shift.new_index,
        })
    }

    /// 座っている席がまだ自分のものか確かめる
    fn stay_seated<N: GridNavigator>(
        &mut self,
        me: Entity,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        let (Some(GuestTarget::Table(table)), Some(seat)) = (self.target, self.seat) else {
            return None;
        };
        if ctx
            .tables
            .get(table)
            .is_some_and(|t| t.is_seat_assigned_to(seat.index, me))
        {
            return None;
        }
        self.seat = None;
        self.reset_to_seeking();
        Some(GuestSignal::TargetLost { table })
    }

    fn seek<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        if self.retry_cooldown > 0 {
            self.retry_cooldown -= 1;
            return None;
        }
        let claimed = self.try_claim_table(me, position, ctx);
        if let Some(GuestSignal::Reserved { .. }) = claimed {
            return claimed;
        }

        let slot = ctx.line.enqueue(me);
        self.waiting_slot = Some(slot);
        let spot = ctx.line.position_for(slot);
        self.head_to_slot(slot, spot, position, ctx);
        claimed.or(Some(GuestSignal::Queued { slot }))
    }

    fn wait_in_line<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        if let Some(signal) = self.poll_table(me, position, ctx) {
            return Some(signal);
        }
        if let Some(signal) = self.follow_line(me, position, ctx) {
            return Some(signal);
        }
        self.retry_slot(position, ctx);
        None
    }

    fn walk<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: &mut Vec2,
        dt: f32,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        match self.target {
            None => {
                self.state = GuestState::SeekingTarget;
                None
            }
            Some(GuestTarget::Table(table)) => {
                if ctx.tables.get(table).is_none() {
                    // 予約はテーブルと一緒に消えている
                    self.reset_to_seeking();
                    return Some(GuestSignal::TargetLost { table });
                }
                match follow_path(position, &mut self.path, self.speed, dt) {
                    StepResult::Moving => None,
                    StepResult::Arrived => Some(self.arrive_at_table(me, table, position, ctx)),
                }
            }
            Some(GuestTarget::WaitingSlot(_)) => {
                if let Some(signal) = self.poll_table(me, *position, ctx) {
                    return Some(signal);
                }
                if let Some(signal) = self.follow_line(me, *position, ctx) {
                    return Some(signal);
                }
                if self.state == GuestState::Walking
                    && follow_path(position, &mut self.path, self.speed, dt) == StepResult::Arrived
                {
                    self.path.clear();
                    self.state = GuestState::Waiting;
                }
                None
            }
        }
    }

    /// 列にいる間の空席チェック（経路失敗のクールダウン中はしない）
    fn poll_table<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        if self.retry_cooldown > 0 {
            self.retry_cooldown -= 1;
            return None;
        }
        self.try_claim_table(me, position, ctx)
    }

    /// テーブルを予約して向かう。
    ///
    /// 経路のないテーブルは予約を返して候補から外し、次のテーブルを試す。
    /// 予約できるテーブルがなければ `None`、あっても全て到達不能なら `PathBlocked`。
    fn try_claim_table<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        let mut unreachable: Vec<Entity> = Vec::new();

        while let Some(table) = ctx.tables.claim_table(me, &unreachable) {
            let path = ctx
                .tables
                .get(table)
                .and_then(|t| Path::plan(ctx.nav, position, t.anchor(), false));
            let Some(path) = path else {
                ctx.tables.cancel_reservation(table, me);
                unreachable.push(table);
                continue;
            };

            if self.waiting_slot.take().is_some()
                && let Some(shifts) = ctx.line.dequeue(me)
            {
                ctx.shifts.extend(shifts);
            }
            self.path = path;
            self.target = Some(GuestTarget::Table(table));
            self.state = GuestState::Walking;
            return Some(GuestSignal::Reserved { table });
        }

        let table = unreachable.first().copied()?;
        self.retry_cooldown = PATHFINDING_RETRY_COOLDOWN_FRAMES;
        Some(GuestSignal::PathBlocked { table })
    }

    /// 列が詰まったら新しい立ち位置へ向かい直す
    fn follow_line<N: GridNavigator>(
        &mut self,
        me: Entity,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> Option<GuestSignal> {
        let slot = ctx.line.enqueue(me);
        if self.waiting_slot == Some(slot) {
            return None;
        }
        self.waiting_slot = Some(slot);
        let spot = ctx.line.position_for(slot);
        self.head_to_slot(slot, spot, position, ctx);
        Some(GuestSignal::Queued { slot })
    }

    /// 立ち位置へ行けずにその場で待っている客の再計画
    fn retry_slot<N: GridNavigator>(&mut self, position: Vec2, ctx: &mut GuestContext<'_, N>) {
        let (Some(frames), Some(slot)) = (self.slot_retry, self.waiting_slot) else {
            return;
        };
        if frames > 0 {
            self.slot_retry = Some(frames - 1);
            return;
        }
        let spot = ctx.line.position_for(slot);
        self.head_to_slot(slot, spot, position, ctx);
    }

    fn head_to_slot<N: GridNavigator>(
        &mut self,
        slot: usize,
        spot: Vec2,
        position: Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) {
        self.target = Some(GuestTarget::WaitingSlot(slot));
        self.slot_retry = None;

        if position.distance(spot) <= ARRIVAL_EPSILON {
            self.path.clear();
            self.state = GuestState::Waiting;
            return;
        }
        match Path::plan(ctx.nav, position, spot, true) {
            Some(path) => {
                self.path = path;
                self.state = GuestState::Walking;
            }
            None => {
                // その場で待ち、しばらくしてから立ち位置への経路を引き直す
                self.path.clear();
                self.state = GuestState::Waiting;
                self.slot_retry = Some(PATHFINDING_RETRY_COOLDOWN_FRAMES);
            }
        }
    }

    fn arrive_at_table<N: GridNavigator>(
        &mut self,
        me: Entity,
        table: Entity,
        position: &mut Vec2,
        ctx: &mut GuestContext<'_, N>,
    ) -> GuestSignal {
        match ctx.tables.seat_reserved_guest(table, me) {
            Ok(claim) => {
                *position = claim.anchor;
                self.path.clear();
                self.seat = Some(claim);
                self.state = GuestState::Seated;
                GuestSignal::Seated { table, seat: claim }
            }
            Err(SeatingError::RaceLost) => {
                self.reset_to_seeking();
                GuestSignal::RaceLost { table }
            }
            Err(_) => {
                self.reset_to_seeking();
                GuestSignal::TargetLost { table }
            }
        }
    }

    fn reset_to_seeking(&mut self) {
        self.target = None;
        self.path.clear();
        self.state = GuestState::SeekingTarget;
    }
}
