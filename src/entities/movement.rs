//! 経路と経路追従
//!
//! 客・スタッフ共通。経路は目的地が変わるたびに作り直す。

use crate::constants::ARRIVAL_EPSILON;
use crate::world::{GridNavigator, GridPos};
use bevy::prelude::*;

/// 経路
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub waypoints: Vec<Vec2>,
    pub current_index: usize,
}

impl Path {
    /// セル列をワールド座標の waypoint に変換する。`final_point` があれば最後に足す
    pub fn from_cells(nav: &impl GridNavigator, cells: &[GridPos], final_point: Option<Vec2>) -> Self {
        let mut waypoints: Vec<Vec2> = cells.iter().map(|&c| nav.world_of(c)).collect();
        if let Some(point) = final_point {
            if waypoints
                .last()
                .is_none_or(|last| last.distance_squared(point) > ARRIVAL_EPSILON * ARRIVAL_EPSILON)
            {
                waypoints.push(point);
            }
        }
        Self {
            waypoints,
            current_index: 0,
        }
    }

    /// 現在地から `goal` への経路を計画する。到達不能なら `None`
    pub fn plan(nav: &impl GridNavigator, from: Vec2, goal: Vec2, snap_to_goal: bool) -> Option<Self> {
        let cells = nav.find_path(nav.cell_of(from), nav.cell_of(goal))?;
        let final_point = snap_to_goal.then_some(goal);
        Some(Self::from_cells(nav, &cells, final_point))
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.current_index = 0;
    }

    pub fn is_finished(&self) -> bool {
        self.current_index >= self.waypoints.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Moving,
    Arrived,
}

/// `speed * dt` だけ経路に沿って進む。waypoint を跨いで進むこともある
pub fn follow_path(position: &mut Vec2, path: &mut Path, speed: f32, dt: f32) -> StepResult {
    let mut budget = (speed * dt).max(0.0);

    while !path.is_finished() {
        let target = path.waypoints[path.current_index];
        let to_target = target - *position;
        let distance = to_target.length();

        if distance <= ARRIVAL_EPSILON || distance <= budget {
            *position = target;
            budget -= distance;
            path.current_index += 1;
            continue;
        }
        if budget <= 0.0 {
            return StepResult::Moving;
        }
        *position += to_target / distance * budget;
        return StepResult::Moving;
    }

    StepResult::Arrived
}
