//! スタッフの状態機械 `Idle → Walking → Executing(kind) → Idle`
//!
//! 毎tick、キューの current と自分の作業を突き合わせる。current が変わっていれば
//! （取り消し・付け替え）その時点で経路を捨てて次の作業に移る。

use super::{StaffAgent, StaffState};
use crate::constants::PATHFINDING_RETRY_COOLDOWN_FRAMES;
use crate::entities::movement::{Path, StepResult, follow_path};
use crate::systems::tasks::{QueuedTask, TaskId, TaskKind};
use crate::world::GridNavigator;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffSignal {
    /// 注文ダイアログを始める（完了は `notify_interaction_finished` 待ち）
    BeginInteraction { task: TaskId, target: Entity },
    Completed { task: TaskId },
    /// ターゲットが見つからない
    InvalidTarget { task: TaskId, target: Entity },
    /// ターゲットまでの経路がない（クールダウン後に再試行）
    PathBlocked { task: TaskId },
}

impl StaffAgent {
    pub fn tick<N: GridNavigator>(
        &mut self,
        position: &mut Vec2,
        dt: f32,
        current: Option<QueuedTask>,
        nav: &N,
        locate: impl Fn(Entity) -> Option<Vec2>,
    ) -> Option<StaffSignal> {
        self.reconcile(current);
        let task = self.active?;

        match self.state {
            StaffState::Idle => None,
            StaffState::Walking => self.walk(task, position, dt, nav, &locate),
            StaffState::Executing(TaskKind::TakeOrder) => {
                if locate(task.target).is_none() {
                    return Some(StaffSignal::InvalidTarget {
                        task: task.id,
                        target: task.target,
                    });
                }
                if self.interaction_finished {
                    Some(self.finish(task))
                } else {
                    None
                }
            }
            StaffState::Executing(_) => Some(self.finish(task)),
        }
    }

    /// 注文ダイアログの終了を受け取る。今のタスクでなければ無視して `false`
    pub fn notify_interaction_finished(&mut self, task: TaskId) -> bool {
        match (self.state, self.active) {
            (StaffState::Executing(TaskKind::TakeOrder), Some(active)) if active.id == task => {
                self.interaction_finished = true;
                true
            }
            _ => false,
        }
    }

    fn reconcile(&mut self, current: Option<QueuedTask>) {
        if self.active.map(|t| t.id) == current.map(|t| t.id) {
            return;
        }
        if let Some(dropped) = self.active {
            if self.state != StaffState::Idle {
                debug!("STAFF: dropped {} {:?}", dropped.id, dropped.kind);
            }
        }
        self.active = current;
        self.path.clear();
        self.planned = false;
        self.interaction_finished = false;
        self.retry_cooldown = 0;
        self.state = if current.is_some() {
            StaffState::Walking
        } else {
            StaffState::Idle
        };
    }

    fn walk<N: GridNavigator>(
        &mut self,
        task: QueuedTask,
        position: &mut Vec2,
        dt: f32,
        nav: &N,
        locate: &impl Fn(Entity) -> Option<Vec2>,
    ) -> Option<StaffSignal> {
        let Some(goal) = locate(task.target) else {
            return Some(StaffSignal::InvalidTarget {
                task: task.id,
                target: task.target,
            });
        };

        if !self.planned {
            if self.retry_cooldown > 0 {
                self.retry_cooldown -= 1;
                return None;
            }
            match Path::plan(nav, *position, goal, false) {
                Some(path) => {
                    self.path = path;
                    self.planned = true;
                }
                None => {
                    self.retry_cooldown = PATHFINDING_RETRY_COOLDOWN_FRAMES;
                    return Some(StaffSignal::PathBlocked { task: task.id });
                }
            }
        }

        if follow_path(position, &mut self.path, self.speed, dt) == StepResult::Moving {
            return None;
        }

        self.path.clear();
        self.state = StaffState::Executing(task.kind);
        match task.kind {
            TaskKind::TakeOrder => Some(StaffSignal::BeginInteraction {
                task: task.id,
                target: task.target,
            }),
            _ => Some(self.finish(task)),
        }
    }

    /// 完了を報告して手を空ける（キューから外すのはオーケストレーター）
    fn finish(&mut self, task: QueuedTask) -> StaffSignal {
        self.active = None;
        self.interaction_finished = false;
        self.planned = false;
        self.state = StaffState::Idle;
        StaffSignal::Completed { task: task.id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldMap;

    const DT: f32 = 0.1;

    struct Shop {
        world: World,
        map: WorldMap,
    }

    impl Shop {
        fn new() -> Self {
            Self {
                world: World::new(),
                map: WorldMap::new(10, 10),
            }
        }

        fn task(&mut self, id: u64, kind: TaskKind) -> QueuedTask {
            QueuedTask {
                id: TaskId(id),
                kind,
                target: self.world.spawn_empty().id(),
            }
        }

        fn at(&self, grid: (i32, i32)) -> Vec2 {
            self.map.grid_to_world(grid.0, grid.1)
        }
    }

    /// シグナルが出るまで回す
    fn run(
        agent: &mut StaffAgent,
        pos: &mut Vec2,
        current: Option<QueuedTask>,
        nav: &WorldMap,
        target_pos: Vec2,
    ) -> Option<StaffSignal> {
        for _ in 0..500 {
            if let Some(signal) = agent.tick(pos, DT, current, nav, |_| Some(target_pos)) {
                return Some(signal);
            }
        }
        None
    }

    #[test]
    fn serve_order_completes_on_arrival() {
        let mut shop = Shop::new();
        let task = shop.task(1, TaskKind::ServeOrder);
        let goal = shop.at((7, 7));
        let mut pos = shop.at((1, 1));
        let mut agent = StaffAgent::new(96.0);

        let signal = run(&mut agent, &mut pos, Some(task), &shop.map, goal);
        assert_eq!(signal, Some(StaffSignal::Completed { task: task.id }));
        assert_eq!(pos, goal);
        assert_eq!(agent.state(), StaffState::Idle);
        assert_eq!(agent.active, None);
    }

    #[test]
    fn take_order_waits_for_the_dialogue() {
        let mut shop = Shop::new();
        let task = shop.task(1, TaskKind::TakeOrder);
        let goal = shop.at((4, 1));
        let mut pos = shop.at((1, 1));
        let mut agent = StaffAgent::new(96.0);

        let signal = run(&mut agent, &mut pos, Some(task), &shop.map, goal);
        assert_eq!(
            signal,
            Some(StaffSignal::BeginInteraction {
                task: task.id,
                target: task.target
            })
        );
        assert_eq!(agent.state(), StaffState::Executing(TaskKind::TakeOrder));
        assert_eq!(agent.tick(&mut pos, DT, Some(task), &shop.map, |_| Some(goal)), None);

        // 別タスクの通知は無視
        assert!(!agent.notify_interaction_finished(TaskId(99)));
        assert!(agent.notify_interaction_finished(task.id));
        assert_eq!(
            agent.tick(&mut pos, DT, Some(task), &shop.map, |_| Some(goal)),
            Some(StaffSignal::Completed { task: task.id })
        );
    }

    #[test]
    fn cancelled_task_is_dropped_mid_walk() {
        let mut shop = Shop::new();
        let first = shop.task(1, TaskKind::ServeOrder);
        let second = shop.task(2, TaskKind::CleanTable);
        let mut pos = shop.at((0, 0));
        let far = shop.at((9, 9));
        let mut agent = StaffAgent::new(32.0);

        assert_eq!(agent.tick(&mut pos, DT, Some(first), &shop.map, |_| Some(far)), None);
        assert_eq!(agent.state(), StaffState::Walking);
        assert!(!agent.path.waypoints.is_empty());

        // オーケストレーターが first を取り消し、second が繰り上がった
        let near = shop.at((1, 0));
        let signal = run(&mut agent, &mut pos, Some(second), &shop.map, near);
        assert_eq!(signal, Some(StaffSignal::Completed { task: second.id }));
        assert_eq!(pos, near);

        // キューが空になれば Idle のまま
        assert_eq!(agent.tick(&mut pos, DT, None, &shop.map, |_| Some(far)), None);
        assert_eq!(agent.state(), StaffState::Idle);
    }

    #[test]
    fn missing_target_is_reported() {
        let mut shop = Shop::new();
        let task = shop.task(1, TaskKind::ServeOrder);
        let mut pos = shop.at((0, 0));
        let mut agent = StaffAgent::new(32.0);

        assert_eq!(
            agent.tick(&mut pos, DT, Some(task), &shop.map, |_| None),
            Some(StaffSignal::InvalidTarget {
                task: task.id,
                target: task.target
            })
        );
    }

    #[test]
    fn unreachable_target_backs_off_before_retrying() {
        let mut shop = Shop::new();
        // (5,5) を囲う
        for (x, y) in [(4, 5), (6, 5), (5, 4), (5, 6), (5, 5)] {
            shop.map.add_obstacle(x, y);
        }
        let task = shop.task(1, TaskKind::CleanTable);
        let goal = shop.at((5, 5));
        let mut pos = shop.at((0, 0));
        let mut agent = StaffAgent::new(32.0);

        assert_eq!(
            agent.tick(&mut pos, DT, Some(task), &shop.map, |_| Some(goal)),
            Some(StaffSignal::PathBlocked { task: task.id })
        );
        for _ in 0..PATHFINDING_RETRY_COOLDOWN_FRAMES {
            assert_eq!(agent.tick(&mut pos, DT, Some(task), &shop.map, |_| Some(goal)), None);
        }
        assert_eq!(
            agent.tick(&mut pos, DT, Some(task), &shop.map, |_| Some(goal)),
            Some(StaffSignal::PathBlocked { task: task.id })
        );
    }
}
