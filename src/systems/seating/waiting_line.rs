//! 空席待ちの列
//!
//! 列のインデックスは常に `0..len` で連続する。途中の客が抜けると後ろの客が詰め、
//! 詰めた客それぞれの新しい立ち位置を返す。

use bevy::prelude::*;

/// 列が伸びる方向（アイソメトリックの斜め4方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Default)]
pub enum LineDirection {
    UpLeft,
    #[default]
    UpRight,
    DownLeft,
    DownRight,
}

impl LineDirection {
    /// 1スロットぶんの単位ベクトル（横 1 : 縦 0.5）
    pub fn unit(self) -> Vec2 {
        match self {
            LineDirection::UpLeft => Vec2::new(-1.0, 0.5),
            LineDirection::UpRight => Vec2::new(1.0, 0.5),
            LineDirection::DownLeft => Vec2::new(-1.0, -0.5),
            LineDirection::DownRight => Vec2::new(1.0, -0.5),
        }
    }
}

/// 列が詰められたときに位置が変わった客
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotShift {
    pub guest: Entity,
    pub new_index: usize,
    pub position: Vec2,
}

#[derive(Resource, Debug, Clone)]
pub struct WaitingLine {
    base: Vec2,
    spacing: f32,
    direction: LineDirection,
    guests: Vec<Entity>,
}

impl WaitingLine {
    pub fn new(base: Vec2, spacing: f32, direction: LineDirection) -> Self {
        Self {
            base,
            spacing,
            direction,
            guests: Vec::new(),
        }
    }

    /// 末尾に並ぶ。既に並んでいれば今のインデックスを返す
    pub fn enqueue(&mut self, guest: Entity) -> usize {
        if let Some(idx) = self.index_of(guest) {
            return idx;
        }
        self.guests.push(guest);
        self.guests.len() - 1
    }

    /// 列から抜ける。後ろにいた客は1つずつ前に詰め、その一覧を返す
    pub fn dequeue(&mut self, guest: Entity) -> Option<Vec<SlotShift>> {
        let idx = self.index_of(guest)?;
        self.guests.remove(idx);
        Some(
            self.guests[idx..]
                .iter()
                .enumerate()
                .map(|(offset, &g)| {
                    let new_index = idx + offset;
                    SlotShift {
                        guest: g,
                        new_index,
                        position: self.position_for(new_index),
                    }
                })
                .collect(),
        )
    }

    pub fn position_for(&self, slot_index: usize) -> Vec2 {
        self.base + self.direction.unit() * self.spacing * slot_index as f32
    }

    pub fn index_of(&self, guest: Entity) -> Option<usize> {
        self.guests.iter().position(|&g| g == guest)
    }

    pub fn guests(&self) -> &[Entity] {
        &self.guests
    }

    pub fn len(&self) -> usize {
        self.guests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with(n: usize) -> (WaitingLine, Vec<Entity>) {
        let mut world = World::new();
        let guests: Vec<Entity> = (0..n).map(|_| world.spawn_empty().id()).collect();
        let mut line = WaitingLine::new(Vec2::new(10.0, 20.0), 8.0, LineDirection::DownLeft);
        for &g in &guests {
            line.enqueue(g);
        }
        (line, guests)
    }

    fn indices_are_contiguous(line: &WaitingLine) -> bool {
        line.guests()
            .iter()
            .enumerate()
            .all(|(i, &g)| line.index_of(g) == Some(i))
    }

    #[test]
    fn enqueue_is_idempotent() {
        let (mut line, g) = line_with(2);
        assert_eq!(line.enqueue(g[1]), 1);
        assert_eq!(line.enqueue(g[0]), 0);
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn dequeue_from_the_middle_compresses_the_line() {
        let (mut line, g) = line_with(4);
        let shifts = line.dequeue(g[1]).expect("queued");
        assert_eq!(
            shifts,
            vec![
                SlotShift {
                    guest: g[2],
                    new_index: 1,
                    position: line.position_for(1)
                },
                SlotShift {
                    guest: g[3],
                    new_index: 2,
                    position: line.position_for(2)
                },
            ]
        );
        assert!(indices_are_contiguous(&line));
        assert_eq!(line.index_of(g[1]), None);
        assert_eq!(line.dequeue(g[1]), None);
    }

    #[test]
    fn dequeue_of_the_tail_shifts_nobody() {
        let (mut line, g) = line_with(3);
        assert_eq!(line.dequeue(g[2]), Some(Vec::new()));
        assert!(indices_are_contiguous(&line));
    }

    #[test]
    fn positions_follow_the_configured_direction() {
        let line = WaitingLine::new(Vec2::ZERO, 10.0, LineDirection::UpRight);
        assert_eq!(line.position_for(0), Vec2::ZERO);
        assert_eq!(line.position_for(2), Vec2::new(20.0, 10.0));
        let line = WaitingLine::new(Vec2::ZERO, 10.0, LineDirection::DownLeft);
        assert_eq!(line.position_for(1), Vec2::new(-10.0, -5.0));
    }
}
