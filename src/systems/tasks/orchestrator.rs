//! タスクオーケストレーター
//!
//! タスクの生成・スタッフへの割り当て・完了/キャンセルの伝播を一手に引き受ける。
//! スタッフのタスクキューを書き換えるのはこの型だけ。
//!
//! # 不変条件
//! - 1つのタスクが同時に2つのキューに入ることはない
//! - 完了・キャンセルは冪等（2回目は何もしない）
//! - 完了・キャンセル時、同じターゲットを狙う他のタスクは全キューから消える

use super::queue::{QueueRemoval, TaskQueue};
use super::types::*;
use bevy::prelude::*;
use std::collections::BTreeMap;

#[derive(Resource, Debug, Default)]
pub struct Orchestrator {
    next_id: u64,
    tasks: BTreeMap<TaskId, Task>,
    queues: BTreeMap<Entity, TaskQueue>,
    /// 登録順のスタッフ一覧（同点時の優先順）
    roster: Vec<Entity>,
    events: Vec<TaskLifecycle>,
}

/// 完了か取り消しか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Completed,
    Cancelled(CancelReason),
}

impl Orchestrator {
    // ============================================================
    // スタッフ登録
    // ============================================================

    pub fn register_staff(&mut self, staff: Entity, bound: usize) {
        if self.queues.contains_key(&staff) {
            return;
        }
        self.queues.insert(staff, TaskQueue::new(bound));
        self.roster.push(staff);
    }

    /// スタッフを外す。抱えていたタスクは未割り当てに戻す
    pub fn unregister_staff(&mut self, staff: Entity) -> Vec<TaskId> {
        let Some(mut queue) = self.queues.remove(&staff) else {
            return Vec::new();
        };
        self.roster.retain(|&s| s != staff);
        let mut returned = Vec::new();
        for queued in queue.drain() {
            if let Some(task) = self.tasks.get_mut(&queued.id) {
                let handles = std::mem::take(&mut task.handles);
                task.assignee = None;
                self.events.push(TaskLifecycle::Unassigned {
                    task: queued.id,
                    staff,
                    handles,
                });
                returned.push(queued.id);
            }
        }
        returned
    }

    /// 登録順
    pub fn staff(&self) -> impl Iterator<Item = Entity> + '_ {
        self.roster.iter().copied()
    }

    pub fn queue(&self, staff: Entity) -> Option<&TaskQueue> {
        self.queues.get(&staff)
    }

    pub fn current_task(&self, staff: Entity) -> Option<&Task> {
        let current = self.queues.get(&staff)?.current()?;
        self.tasks.get(&current.id)
    }

    // ============================================================
    // タスク生成・参照
    // ============================================================

    /// タスクを生成する。ハンドルは割り当てまで空のまま
    pub fn create_task(&mut self, kind: TaskKind, target: Entity) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.insert(
            id,
            Task {
                id,
                kind,
                target,
                assignee: None,
                handles: TaskHandles::default(),
            },
        );
        debug!("TASK: created {} {:?} -> {:?}", id, kind, target);
        id
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// 同じ (ターゲット, 種類) の生きているタスク
    pub fn find_task(&self, target: Entity, kind: TaskKind) -> Option<TaskId> {
        self.tasks
            .values()
            .find(|t| t.target == target && t.kind == kind)
            .map(|t| t.id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// まだ誰にも割り当てられていないタスク（ID順 = 生成順）
    pub fn unassigned(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(|t| t.assignee.is_none())
    }

    // ============================================================
    // 割り当て
    // ============================================================

    pub fn assign(&mut self, id: TaskId, staff: Entity) -> AssignResult {
        let Some(task) = self.tasks.get(&id) else {
            return AssignResult::Rejected(TaskError::InvalidTarget);
        };
        let queued = task.queued();
        let previous = task.assignee;

        if previous == Some(staff) {
            return AssignResult::Accepted;
        }

        let Some(queue) = self.queues.get_mut(&staff) else {
            return AssignResult::Rejected(TaskError::UnknownStaff(staff));
        };
        if let Err(err) = queue.try_enqueue(queued) {
            return AssignResult::Rejected(err);
        }

        // 付け替え: 新しいキューが受理してから古いキューから外す
        if let Some(old_staff) = previous {
            if let Some(old_queue) = self.queues.get_mut(&old_staff) {
                old_queue.remove(id);
            }
        }

        let Some(task) = self.tasks.get_mut(&id) else {
            return AssignResult::Rejected(TaskError::InvalidTarget);
        };
        if let Some(old_staff) = previous {
            self.events.push(TaskLifecycle::Unassigned {
                task: id,
                staff: old_staff,
                handles: std::mem::take(&mut task.handles),
            });
        }
        task.assignee = Some(staff);
        self.events.push(TaskLifecycle::Assigned {
            task: id,
            kind: task.kind,
            target: task.target,
            staff,
        });
        info!("TASK: {} {:?} assigned to staff {:?}", id, task.kind, staff);
        AssignResult::Accepted
    }

    /// プレゼンテーション層が作ったハンドルを結び付ける
    pub fn link_handles(&mut self, id: TaskId, handles: TaskHandles) -> bool {
        match self.tasks.get_mut(&id) {
            Some(task) if task.assignee.is_some() => {
                task.handles = handles;
                true
            }
            _ => false,
        }
    }

    // ============================================================
    // 完了・キャンセル
    // ============================================================

    /// タスクを完了させる。既に終わっていれば何もせず `false`
    pub fn complete_task(&mut self, id: TaskId) -> bool {
        self.resolve(id, Resolution::Completed)
    }

    /// タスクを取り消す。完了と同じ伝播を行うが効果は発生しない
    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        self.resolve(id, Resolution::Cancelled(CancelReason::Requested))
    }

    /// ターゲットが消えたときに、そのターゲットを狙う全タスクを取り消す
    pub fn cancel_tasks_for_target(&mut self, target: Entity) -> usize {
        let ids: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|t| t.target == target)
            .map(|t| t.id)
            .collect();
        ids.into_iter()
            .filter(|&id| self.resolve(id, Resolution::Cancelled(CancelReason::TargetLost)))
            .count()
    }

    fn resolve(&mut self, id: TaskId, resolution: Resolution) -> bool {
        let Some(task) = self.tasks.remove(&id) else {
            debug!("TASK: {} already resolved, ignoring {:?}", id, resolution);
            return false;
        };

        if let Some(staff) = task.assignee {
            if let Some(queue) = self.queues.get_mut(&staff) {
                if let QueueRemoval::Current {
                    promoted: Some(next),
                } = queue.remove(id)
                {
                    debug!("TASK: staff {:?} promoted {}", staff, next);
                }
            }
        }
        self.push_resolution(task.clone(), resolution);

        // 同じターゲットを狙う重複タスクを全キューから消す
        let mut superseded: Vec<TaskId> = Vec::new();
        for queue in self.queues.values_mut() {
            superseded.extend(queue.remove_matching_target(task.target));
        }
        superseded.extend(
            self.tasks
                .values()
                .filter(|t| t.target == task.target && t.assignee.is_none())
                .map(|t| t.id),
        );
        for dup in superseded {
            if let Some(dup_task) = self.tasks.remove(&dup) {
                debug!("TASK: {} superseded by {}", dup, id);
                self.push_resolution(dup_task, Resolution::Cancelled(CancelReason::Superseded));
            }
        }

        match resolution {
            Resolution::Completed => info!("TASK: {} {:?} completed", id, task.kind),
            Resolution::Cancelled(reason) => {
                info!("TASK: {} {:?} cancelled ({:?})", id, task.kind, reason)
            }
        }
        true
    }

    fn push_resolution(&mut self, task: Task, resolution: Resolution) {
        let event = match resolution {
            Resolution::Completed => TaskLifecycle::Completed {
                task: task.id,
                kind: task.kind,
                target: task.target,
                staff: task.assignee,
                handles: task.handles,
            },
            Resolution::Cancelled(reason) => TaskLifecycle::Cancelled {
                task: task.id,
                kind: task.kind,
                target: task.target,
                staff: task.assignee,
                handles: task.handles,
                reason,
            },
        };
        self.events.push(event);
    }

    /// 溜まったライフサイクルイベントを取り出す
    pub fn drain_events(&mut self) -> Vec<TaskLifecycle> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        world: World,
        orchestrator: Orchestrator,
    }

    impl Fixture {
        fn new(staff: usize, bound: usize) -> (Self, Vec<Entity>) {
            let mut world = World::new();
            let mut orchestrator = Orchestrator::default();
            let staff: Vec<Entity> = (0..staff).map(|_| world.spawn_empty().id()).collect();
            for &s in &staff {
                orchestrator.register_staff(s, bound);
            }
            (
                Self {
                    world,
                    orchestrator,
                },
                staff,
            )
        }

        fn entity(&mut self) -> Entity {
            self.world.spawn_empty().id()
        }
    }

    fn queue_len(o: &Orchestrator, staff: Entity) -> usize {
        o.queue(staff).map(TaskQueue::len).unwrap_or(0)
    }

    #[test]
    fn create_leaves_task_unassigned_without_handles() {
        let (mut fx, _) = Fixture::new(1, 3);
        let guest = fx.entity();
        let id = fx.orchestrator.create_task(TaskKind::TakeOrder, guest);
        let task = fx.orchestrator.task(id).expect("created");
        assert_eq!(task.assignee, None);
        assert!(task.handles.is_empty());
        assert_eq!(fx.orchestrator.find_task(guest, TaskKind::TakeOrder), Some(id));
        assert_eq!(fx.orchestrator.find_task(guest, TaskKind::ServeOrder), None);
        assert_eq!(fx.orchestrator.unassigned().count(), 1);
    }

    #[test]
    fn assign_rejects_when_queue_is_full() {
        let (mut fx, staff) = Fixture::new(1, 3);
        let ids: Vec<TaskId> = (0..4)
            .map(|_| {
                let target = fx.entity();
                fx.orchestrator.create_task(TaskKind::ServeOrder, target)
            })
            .collect();
        for &id in &ids[..3] {
            assert_eq!(fx.orchestrator.assign(id, staff[0]), AssignResult::Accepted);
        }
        assert_eq!(
            fx.orchestrator.assign(ids[3], staff[0]),
            AssignResult::Rejected(TaskError::QueueFull)
        );
        assert_eq!(fx.orchestrator.task(ids[3]).and_then(|t| t.assignee), None);

        assert!(fx.orchestrator.complete_task(ids[0]));
        assert_eq!(fx.orchestrator.current_task(staff[0]).map(|t| t.id), Some(ids[1]));
        assert_eq!(fx.orchestrator.assign(ids[3], staff[0]), AssignResult::Accepted);
    }

    #[test]
    fn assign_rejects_unknown_task_and_staff() {
        let (mut fx, staff) = Fixture::new(1, 3);
        let target = fx.entity();
        let stranger = fx.entity();
        let id = fx.orchestrator.create_task(TaskKind::CleanTable, target);
        assert_eq!(
            fx.orchestrator.assign(id, stranger),
            AssignResult::Rejected(TaskError::UnknownStaff(stranger))
        );
        assert_eq!(
            fx.orchestrator.assign(TaskId(999), staff[0]),
            AssignResult::Rejected(TaskError::InvalidTarget)
        );
    }

    #[test]
    fn completing_twice_is_a_silent_no_op() {
        let (mut fx, staff) = Fixture::new(1, 3);
        let target = fx.entity();
        let id = fx.orchestrator.create_task(TaskKind::ServeOrder, target);
        fx.orchestrator.assign(id, staff[0]);
        fx.orchestrator.drain_events();

        assert!(fx.orchestrator.complete_task(id));
        let after_first = fx.orchestrator.drain_events();
        assert_eq!(after_first.len(), 1);

        assert!(!fx.orchestrator.complete_task(id));
        assert!(!fx.orchestrator.cancel_task(id));
        assert!(fx.orchestrator.drain_events().is_empty());
        assert_eq!(queue_len(&fx.orchestrator, staff[0]), 0);
    }

    #[test]
    fn completion_purges_duplicates_from_other_queues() {
        let (mut fx, staff) = Fixture::new(2, 3);
        let table_x = fx.entity();
        let other = fx.entity();
        let first = fx.orchestrator.create_task(TaskKind::CleanTable, table_x);
        let duplicate = fx.orchestrator.create_task(TaskKind::CleanTable, table_x);
        let unrelated = fx.orchestrator.create_task(TaskKind::ServeOrder, other);
        fx.orchestrator.assign(first, staff[0]);
        fx.orchestrator.assign(unrelated, staff[1]);
        fx.orchestrator.assign(duplicate, staff[1]);
        let handles = TaskHandles {
            target_marker: Some(fx.entity()),
            staff_marker: Some(fx.entity()),
        };
        assert!(fx.orchestrator.link_handles(duplicate, handles));
        fx.orchestrator.drain_events();

        assert!(fx.orchestrator.complete_task(first));

        assert_eq!(queue_len(&fx.orchestrator, staff[1]), 1);
        assert!(!fx.orchestrator.is_active(duplicate));
        assert!(fx.orchestrator.is_active(unrelated));

        let events = fx.orchestrator.drain_events();
        let superseded_handles = events.iter().find_map(|e| match e {
            TaskLifecycle::Cancelled {
                task,
                reason: CancelReason::Superseded,
                handles,
                ..
            } if *task == duplicate => Some(*handles),
            _ => None,
        });
        // 重複タスクのハンドルは破棄対象として通知される
        assert_eq!(superseded_handles.map(|h| h.iter().count()), Some(2));
    }

    #[test]
    fn a_task_lives_in_at_most_one_queue() {
        let (mut fx, staff) = Fixture::new(2, 3);
        let target = fx.entity();
        let id = fx.orchestrator.create_task(TaskKind::ServeOrder, target);
        fx.orchestrator.assign(id, staff[0]);
        assert_eq!(fx.orchestrator.assign(id, staff[1]), AssignResult::Accepted);

        let holders = staff
            .iter()
            .filter(|&&s| fx.orchestrator.queue(s).is_some_and(|q| q.contains(id)))
            .count();
        assert_eq!(holders, 1);
        assert_eq!(fx.orchestrator.task(id).and_then(|t| t.assignee), Some(staff[1]));
    }

    #[test]
    fn cancelling_current_promotes_next() {
        let (mut fx, staff) = Fixture::new(1, 3);
        let a = fx.entity();
        let b = fx.entity();
        let first = fx.orchestrator.create_task(TaskKind::ServeOrder, a);
        let second = fx.orchestrator.create_task(TaskKind::ServeOrder, b);
        fx.orchestrator.assign(first, staff[0]);
        fx.orchestrator.assign(second, staff[0]);

        assert!(fx.orchestrator.cancel_task(first));
        assert_eq!(fx.orchestrator.current_task(staff[0]).map(|t| t.id), Some(second));
    }

    #[test]
    fn target_loss_cancels_everything_aimed_at_it() {
        let (mut fx, staff) = Fixture::new(1, 3);
        let guest = fx.entity();
        let take = fx.orchestrator.create_task(TaskKind::TakeOrder, guest);
        let serve = fx.orchestrator.create_task(TaskKind::ServeOrder, guest);
        fx.orchestrator.assign(take, staff[0]);

        assert_eq!(fx.orchestrator.cancel_tasks_for_target(guest), 2);
        assert!(!fx.orchestrator.is_active(take));
        assert!(!fx.orchestrator.is_active(serve));
        assert_eq!(queue_len(&fx.orchestrator, staff[0]), 0);
    }

    #[test]
    fn unregistering_staff_returns_tasks_to_the_pool() {
        let (mut fx, staff) = Fixture::new(2, 3);
        let target = fx.entity();
        let id = fx.orchestrator.create_task(TaskKind::CleanTable, target);
        fx.orchestrator.assign(id, staff[0]);
        assert_eq!(fx.orchestrator.unregister_staff(staff[0]), vec![id]);
        assert_eq!(fx.orchestrator.unassigned().map(|t| t.id).collect::<Vec<_>>(), vec![id]);
        assert_eq!(fx.orchestrator.assign(id, staff[1]), AssignResult::Accepted);
        assert_eq!(fx.orchestrator.staff().collect::<Vec<_>>(), vec![staff[1]]);
    }

    #[test]
    fn staff_are_listed_in_registration_order() {
        let mut world = World::new();
        let spawned: Vec<Entity> = (0..4).map(|_| world.spawn_empty().id()).collect();
        let mut orchestrator = Orchestrator::default();
        // エンティティの並びと逆順に登録する
        for &s in spawned.iter().rev() {
            orchestrator.register_staff(s, 3);
        }
        orchestrator.register_staff(spawned[3], 5);

        let expected: Vec<Entity> = spawned.iter().rev().copied().collect();
        assert_eq!(orchestrator.staff().collect::<Vec<_>>(), expected);
        assert_eq!(orchestrator.queue(spawned[3]).map(TaskQueue::bound), Some(3));
    }
}
