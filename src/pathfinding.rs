// src/pathfinding.rs
//! Поиск пути A* по 8 направлениям
//!
//! Стоимость шага — евклидово расстояние (1 или √2), эвристика — евклидово расстояние до цели.
//! Вода непроходима: такие клетки сразу попадают в закрытое множество.
//!
//! В режиме `Heuristic` клетка выбирается только по эвристике и путь восстанавливается,
//! как только цель встречается среди соседей раскрываемой клетки. В режиме `TotalCost`
//! это обычный A* с проверкой цели при извлечении из кучи, путь кратчайший.
//!
//! Каждая клетка закрывается не более одного раза, поэтому поиск всегда завершается:
//! либо путём, либо `GenError::PathNotFound`, когда открытое множество исчерпано.

use crate::error::{GenError, Result};
use crate::grid::{Coord, SpatialGrid};
use crate::neighbors::NEIGHBORS_8;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Правило выбора следующей клетки из открытого множества
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontierSelection {
    /// Только эвристика `h`: жадный поиск, путь не обязательно кратчайший
    #[default]
    Heuristic,
    /// Классический A*: `f = g + h`
    TotalCost,
}

impl FrontierSelection {
    fn priority(self, cost: f32, heuristic: f32) -> f32 {
        match self {
            FrontierSelection::Heuristic => heuristic,
            FrontierSelection::TotalCost => cost + heuristic,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    priority: f32,
    order: u64,
    coord: Coord,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap — максимальная куча, поэтому сравнение перевёрнуто.
        // При равном приоритете раньше выходит клетка, добавленная раньше.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

fn step_cost(dx: i32, dy: i32) -> f32 {
    if dx != 0 && dy != 0 {
        std::f32::consts::SQRT_2
    } else {
        1.0
    }
}

/// Ищет путь от `start` до `goal`. Путь включает обе конечные клетки.
pub fn find_path(
    grid: &SpatialGrid,
    start: Coord,
    goal: Coord,
    selection: FrontierSelection,
) -> Result<Vec<Coord>> {
    let not_found = || GenError::PathNotFound {
        from: start,
        to: goal,
    };

    let (Some(start_idx), Some(goal_idx)) = (grid.index(start), grid.index(goal)) else {
        return Err(not_found());
    };
    if start == goal {
        return Ok(vec![start]);
    }
    if grid.is_water(goal) {
        return Err(not_found());
    }

    let total = grid.len();
    let mut cost = vec![f32::INFINITY; total];
    let mut came_from: Vec<Option<usize>> = vec![None; total];
    let mut closed = vec![false; total];
    let mut open = BinaryHeap::new();
    let mut order = 0u64;

    cost[start_idx] = 0.0;
    open.push(OpenEntry {
        priority: selection.priority(0.0, start.distance(goal)),
        order,
        coord: start,
    });

    while let Some(OpenEntry { coord: current, .. }) = open.pop() {
        let Some(current_idx) = grid.index(current) else {
            continue;
        };
        // Устаревшая запись кучи
        if closed[current_idx] {
            continue;
        }
        if current_idx == goal_idx {
            return Ok(reconstruct(grid, &came_from, goal_idx));
        }
        closed[current_idx] = true;

        for &(dx, dy) in &NEIGHBORS_8 {
            let next = current.offset(dx, dy);
            let Some(next_idx) = grid.index(next) else {
                continue;
            };
            if closed[next_idx] {
                continue;
            }
            if grid.is_water(next) {
                closed[next_idx] = true;
                continue;
            }

            // Жадный режим завершается, как только цель показалась среди соседей
            if next_idx == goal_idx && selection == FrontierSelection::Heuristic {
                came_from[goal_idx] = Some(current_idx);
                return Ok(reconstruct(grid, &came_from, goal_idx));
            }

            let tentative = cost[current_idx] + step_cost(dx, dy);
            if tentative < cost[next_idx] {
                cost[next_idx] = tentative;
                came_from[next_idx] = Some(current_idx);
                order += 1;
                open.push(OpenEntry {
                    priority: selection.priority(tentative, next.distance(goal)),
                    order,
                    coord: next,
                });
            }
        }
    }

    Err(not_found())
}

fn reconstruct(grid: &SpatialGrid, came_from: &[Option<usize>], goal_idx: usize) -> Vec<Coord> {
    let mut path = vec![grid.coord_of(goal_idx)];
    let mut current = goal_idx;
    while let Some(prev) = came_from[current] {
        path.push(grid.coord_of(prev));
        current = prev;
    }
    path.reverse();
    path
}

/// Длина ломаной по центрам клеток
#[must_use]
pub fn polyline_length(path: &[Coord]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}
