// src/neighbors.rs
//! Запросы соседей клетки
//!
//! - 8-соседство: все клетки вокруг, перебор `dx` снаружи, `dy` внутри
//! - строгие соседи: 4 клетки по осям в порядке восток, запад, юг, север
//!
//! Варианты `lowest_*` сортируют соседей по возрастанию высоты. Сортировка устойчивая,
//! поэтому при равных высотах сохраняется порядок перебора.

use crate::grid::{Coord, SpatialGrid};

pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const STRICT_NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn in_bounds_offsets(grid: &SpatialGrid, c: Coord, offsets: &[(i32, i32)]) -> Vec<Coord> {
    offsets
        .iter()
        .map(|&(dx, dy)| c.offset(dx, dy))
        .filter(|&n| grid.in_bounds(n))
        .collect()
}

/// 8 соседей в пределах сетки, в порядке перебора
#[must_use]
pub fn neighbors(grid: &SpatialGrid, c: Coord) -> Vec<Coord> {
    in_bounds_offsets(grid, c, &NEIGHBORS_8)
}

/// Строгие (4) соседи в пределах сетки, в порядке перебора
#[must_use]
pub fn strict_neighbors(grid: &SpatialGrid, c: Coord) -> Vec<Coord> {
    in_bounds_offsets(grid, c, &STRICT_NEIGHBORS)
}

/// Устойчивая сортировка по возрастанию высоты. Клетки за границей уходят в конец.
pub fn sort_by_elevation(grid: &SpatialGrid, cells: &mut [Coord]) {
    let height = |c: &Coord| grid.elevation(*c).unwrap_or(f32::INFINITY);
    cells.sort_by(|a, b| height(a).total_cmp(&height(b)));
}

/// 8 соседей от самого низкого к самому высокому
#[must_use]
pub fn lowest_neighbors(grid: &SpatialGrid, c: Coord) -> Vec<Coord> {
    let mut cells = neighbors(grid, c);
    sort_by_elevation(grid, &mut cells);
    cells
}

/// Строгие соседи от самого низкого к самому высокому
#[must_use]
pub fn lowest_strict_neighbors(grid: &SpatialGrid, c: Coord) -> Vec<Coord> {
    let mut cells = strict_neighbors(grid, c);
    sort_by_elevation(grid, &mut cells);
    cells
}
