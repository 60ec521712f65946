use super::map::WorldMap;
use super::navigator::GridPos;
use crate::constants::PATHFINDING_MAX_EXPANSIONS;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

// A*のためのノード
#[derive(Clone, Eq, PartialEq)]
pub struct PathNode {
    pub pos: GridPos,
    pub g_cost: i32,
    pub f_cost: i32,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // 最小ヒープにするため逆順。f が同じなら座標で決定的に並べる
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// A*パスファインディング
pub fn find_path(world_map: &WorldMap, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    // 目的地（逆引きならエージェント）が通行不能なら到達不能
    if !world_map.is_walkable(goal.0, goal.1) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
    let mut g_score: HashMap<GridPos, i32> = HashMap::new();

    let heuristic =
        |a: GridPos, b: GridPos| -> i32 { ((a.0 - b.0).abs() + (a.1 - b.1).abs()) * 10 };

    g_score.insert(start, 0);
    open_set.push(PathNode {
        pos: start,
        g_cost: 0,
        f_cost: heuristic(start, goal),
    });

    // 4方向に限定
    let directions = [(0, 1), (0, -1), (1, 0), (-1, 0)];
    let mut expansions = 0usize;

    while let Some(current) = open_set.pop() {
        if current.pos == goal {
            // パスを再構築
            let mut path = vec![goal];
            let mut current_pos = goal;
            while let Some(&prev) = came_from.get(&current_pos) {
                path.push(prev);
                current_pos = prev;
            }
            path.reverse();
            return Some(path);
        }

        // 古いエントリは捨てる
        if current.g_cost > *g_score.get(&current.pos).unwrap_or(&i32::MAX) {
            continue;
        }

        expansions += 1;
        if expansions > PATHFINDING_MAX_EXPANSIONS {
            return None;
        }

        for (dx, dy) in &directions {
            let neighbor = (current.pos.0 + dx, current.pos.1 + dy);

            if !world_map.is_walkable(neighbor.0, neighbor.1) {
                continue;
            }

            // 直線移動のコスト（10）
            let tentative_g = current.g_cost + 10;

            if tentative_g < *g_score.get(&neighbor).unwrap_or(&i32::MAX) {
                came_from.insert(neighbor, current.pos);
                g_score.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    pos: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + heuristic(neighbor, goal),
                });
            }
        }
    }

    None
}

/// ターゲットの隣接マスへのパスを検索（ターゲット自体には入らない）
pub fn find_path_to_adjacent(
    world_map: &WorldMap,
    start: GridPos,
    target: GridPos,
) -> Option<Vec<GridPos>> {
    // ターゲット（テーブル）から開始点（エージェント）に向かって逆引きで探す。
    // ターゲット自体が通行不能でも、最初の展開で隣接する通行可能マスに移る
    let mut path = find_path(world_map, target, start)?;

    // [target, neighbor, ..., start] → [start, ..., neighbor] にする
    path.reverse();
    path.pop();

    if path.is_empty() {
        // すでにターゲットの隣にいる
        Some(vec![start])
    } else {
        Some(path)
    }
}
