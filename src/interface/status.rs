//! 表示層向けの読み取り専用ビューと定期ログ

use crate::constants::STATUS_LOG_INTERVAL_SECS;
use crate::entities::guest::{GuestAgent, GuestState, GuestTarget};
use crate::entities::staff::{StaffAgent, StaffState};
use crate::events::{
    GuestDepartedEvent, GuestSeatedEvent, GuestStateChangedEvent, TaskAssignmentRejected,
    TaskCompletedEvent,
};
use crate::systems::seating::{Table, TableAvailabilityIndex, WaitingLine};
use crate::systems::tasks::{Orchestrator, QueuedTask, TaskKind};
use bevy::prelude::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuestView {
    pub state: GuestState,
    pub target: Option<GuestTarget>,
    pub waiting_slot: Option<usize>,
    /// 着席中の席番号
    pub seat: Option<usize>,
}

impl GuestView {
    pub fn of(agent: &GuestAgent) -> Self {
        Self {
            state: agent.state(),
            target: agent.target(),
            waiting_slot: agent.waiting_slot(),
            seat: agent.seat().map(|claim| claim.index),
        }
    }
}

/// スタッフのタスク（表示順: current → pending）
#[derive(Debug, Clone, PartialEq)]
pub struct StaffView {
    pub current: Option<QueuedTask>,
    pub pending: Vec<QueuedTask>,
}

impl StaffView {
    pub fn of(orchestrator: &Orchestrator, staff: Entity) -> Option<Self> {
        let queue = orchestrator.queue(staff)?;
        Some(Self {
            current: queue.current().copied(),
            pending: queue.pending().copied().collect(),
        })
    }

    pub fn display_order(&self) -> impl Iterator<Item = &QueuedTask> {
        self.current.iter().chain(self.pending.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub seated: usize,
    pub reserved: usize,
    pub capacity: usize,
    /// 席ごとの着席客（宣言順）
    pub occupants: Vec<Option<Entity>>,
}

impl TableView {
    pub fn of(table: &Table) -> Self {
        Self {
            seated: table.seated_count(),
            reserved: table.reserved_count(),
            capacity: table.capacity(),
            occupants: table.seats().seats().iter().map(|s| s.occupant()).collect(),
        }
    }
}

/// 店全体の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BarSummary {
    pub seeking: usize,
    pub walking: usize,
    pub waiting: usize,
    pub seated: usize,
    pub line_len: usize,
    pub seats_taken: usize,
    pub seats_reserved: usize,
    pub seats_total: usize,
    pub busy_staff: usize,
    pub open_tasks: usize,
    pub unassigned_tasks: usize,
}

impl BarSummary {
    pub fn collect<'a>(
        guests: impl Iterator<Item = GuestView>,
        tables: impl Iterator<Item = &'a Table>,
        staff: impl Iterator<Item = StaffState>,
        line: &WaitingLine,
        orchestrator: &Orchestrator,
    ) -> Self {
        let mut summary = Self {
            line_len: line.len(),
            open_tasks: orchestrator.tasks().count(),
            unassigned_tasks: orchestrator.unassigned().count(),
            ..default()
        };
        for guest in guests {
            match guest.state {
                GuestState::SeekingTarget => summary.seeking += 1,
                GuestState::Walking => summary.walking += 1,
                GuestState::Waiting => summary.waiting += 1,
                GuestState::Seated => summary.seated += 1,
            }
        }
        for view in tables.map(TableView::of) {
            summary.seats_taken += view.seated;
            summary.seats_reserved += view.reserved;
            summary.seats_total += view.capacity;
        }
        summary.busy_staff = staff.filter(|s| *s != StaffState::Idle).count();
        summary
    }
}

impl fmt::Display for BarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "guests seeking={} walking={} waiting={} seated={} | line={} | seats {}/{} (+{} reserved) | staff busy={} | tasks open={} unassigned={}",
            self.seeking,
            self.walking,
            self.waiting,
            self.seated,
            self.line_len,
            self.seats_taken,
            self.seats_total,
            self.seats_reserved,
            self.busy_staff,
            self.open_tasks,
            self.unassigned_tasks
        )
    }
}

/// 開店からの累計
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftStats {
    pub seated: usize,
    pub departed: usize,
    pub state_changes: usize,
    pub orders_taken: usize,
    pub served: usize,
    pub cleaned: usize,
    pub score_total: u32,
    pub rejected_requests: usize,
}

impl ShiftStats {
    /// 提供1回あたりの平均スコア
    pub fn average_score(&self) -> Option<f32> {
        (self.served > 0).then(|| self.score_total as f32 / self.served as f32)
    }
}

impl fmt::Display for ShiftStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shift seated={} departed={} orders={} served={} cleaned={} rejected={}",
            self.seated,
            self.departed,
            self.orders_taken,
            self.served,
            self.cleaned,
            self.rejected_requests
        )?;
        if let Some(avg) = self.average_score() {
            write!(f, " avg_score={avg:.1}")?;
        }
        Ok(())
    }
}

pub fn shift_stats_system(
    mut stats: ResMut<ShiftStats>,
    mut ev_seated: MessageReader<GuestSeatedEvent>,
    mut ev_state: MessageReader<GuestStateChangedEvent>,
    mut ev_departed: MessageReader<GuestDepartedEvent>,
    mut ev_completed: MessageReader<TaskCompletedEvent>,
    mut ev_rejected: MessageReader<TaskAssignmentRejected>,
) {
    for event in ev_seated.read() {
        trace!("STATS: guest {:?} seated at {:?}", event.guest, event.table);
        stats.seated += 1;
    }
    for event in ev_state.read() {
        trace!("STATS: guest {:?} {:?} -> {:?}", event.guest, event.from, event.to);
        stats.state_changes += 1;
    }
    for event in ev_departed.read() {
        trace!("STATS: guest {:?} left table {:?}", event.guest, event.table);
        stats.departed += 1;
    }
    for event in ev_completed.read() {
        trace!(
            "STATS: {} {:?} on {:?} by {:?}",
            event.task, event.kind, event.target, event.staff
        );
        match event.kind {
            TaskKind::TakeOrder => stats.orders_taken += 1,
            TaskKind::ServeOrder => {
                stats.served += 1;
                stats.score_total += event.score.unwrap_or(0);
            }
            TaskKind::CleanTable => stats.cleaned += 1,
        }
    }
    for event in ev_rejected.read() {
        debug!(
            "STATS: {} rejected by staff {:?}: {}",
            event.task, event.staff, event.reason
        );
        stats.rejected_requests += 1;
    }
}

pub fn bar_status_log_system(
    time: Res<Time>,
    mut elapsed: Local<f32>,
    tables: Res<TableAvailabilityIndex>,
    line: Res<WaitingLine>,
    orchestrator: Res<Orchestrator>,
    stats: Res<ShiftStats>,
    q_guests: Query<(Entity, &GuestAgent)>,
    q_staff: Query<&StaffAgent>,
) {
    *elapsed += time.delta_secs();
    if *elapsed < STATUS_LOG_INTERVAL_SECS {
        return;
    }
    *elapsed = 0.0;

    let summary = BarSummary::collect(
        q_guests.iter().map(|(_, agent)| GuestView::of(agent)),
        tables.iter(),
        q_staff.iter().map(StaffAgent::state),
        &line,
        &orchestrator,
    );
    info!("BAR_STATUS: {} | {}", summary, *stats);

    for (guest, agent) in q_guests.iter() {
        let view = GuestView::of(agent);
        debug!(
            "BAR_STATUS: guest {:?} {:?} target={:?} slot={:?} seat={:?}",
            guest, view.state, view.target, view.waiting_slot, view.seat
        );
    }
    for table in tables.iter() {
        let view = TableView::of(table);
        debug!(
            "BAR_STATUS: table {:?} {}/{} (+{}) {:?}",
            table.entity(),
            view.seated,
            view.capacity,
            view.reserved,
            view.occupants
        );
    }

    for staff in orchestrator.staff() {
        if let Some(view) = StaffView::of(&orchestrator, staff) {
            let tasks: Vec<String> = view
                .display_order()
                .map(|t| format!("{}:{:?}", t.id, t.kind))
                .collect();
            debug!("BAR_STATUS: staff {:?} [{}]", staff, tasks.join(", "));
        }
    }
}
