// src/proximity.rs
//! Поиск ближайшего элемента кольцами
//!
//! Кольца растут по расстоянию Чебышёва: r = 0, 1, 2, …
//! Внутри кольца перебираются смещения `(x, y)` при `x, y ∈ [-r, 0]` вдоль его края
//! и их четыре отражения по квадрантам: `(x, y)`, `(-x, y)`, `(x, -y)`, `(-x, -y)`.
//! Возвращается первая найденная клетка, поэтому среди клеток одного кольца побеждает
//! порядок обхода, а не истинное евклидово расстояние.
//!
//! Поиск прекращается, когда в кольце не осталось ни одной клетки внутри сетки.

use crate::grid::{Coord, ElementKind, SpatialGrid};

/// Найденная клетка и радиус кольца, на котором она обнаружена
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nearest {
    pub coord: Coord,
    pub radius: u32,
}

#[must_use]
pub fn find_nearest(grid: &SpatialGrid, origin: Coord, kind: ElementKind) -> Option<Nearest> {
    let mut radius: i32 = 0;

    loop {
        let mut in_range = false;

        for x in -radius..=0 {
            for y in -radius..=0 {
                for (dx, dy) in [(x, y), (-x, y), (x, -y), (-x, -y)] {
                    let candidate = origin.offset(dx, dy);
                    if let Some(cell) = grid.get(candidate) {
                        in_range = true;
                        if cell.has(kind) {
                            return Some(Nearest {
                                coord: candidate,
                                radius: radius as u32,
                            });
                        }
                    }
                }
                // Внутренние столбцы кольца: только крайняя строка
                if x != -radius {
                    break;
                }
            }
        }

        if !in_range {
            return None;
        }
        radius += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::classify_grid;
    use crate::config::ElevationBands;
    use crate::heightmap::{GradientField, Heightmap};
    use crate::render::HandleAllocator;

    fn plain_grid(width: u32, length: u32) -> SpatialGrid {
        let hm = Heightmap::from_data(width, length, vec![5.0; (width * length) as usize]);
        classify_grid(&hm, &GradientField::flat(width, length), &ElevationBands::default())
    }

    #[test]
    fn finds_element_in_origin_cell() {
        let mut grid = plain_grid(4, 4);
        let mut renderer = HandleAllocator::new();
        grid.add_element(Coord::new(2, 2), ElementKind::River, &mut renderer);
        let found = find_nearest(&grid, Coord::new(2, 2), ElementKind::River).unwrap();
        assert_eq!(found.coord, Coord::new(2, 2));
        assert_eq!(found.radius, 0);
    }

    #[test]
    fn ring_radius_is_chebyshev() {
        let mut grid = plain_grid(12, 12);
        let mut renderer = HandleAllocator::new();
        // смещение (2, -2): евклидово ≈ 2.83, но кольцо 2
        grid.add_element(Coord::new(7, 4), ElementKind::Forest, &mut renderer);
        let found = find_nearest(&grid, Coord::new(5, 6), ElementKind::Forest).unwrap();
        assert_eq!(found.coord, Coord::new(7, 4));
        assert_eq!(found.radius, 2);
    }

    #[test]
    fn same_ring_tie_follows_scan_order() {
        let mut grid = plain_grid(10, 10);
        let mut renderer = HandleAllocator::new();
        // обе клетки на кольце 1 от (5, 5); (4, 4) = смещение (-1, -1) проверяется первым
        grid.add_element(Coord::new(6, 5), ElementKind::River, &mut renderer);
        grid.add_element(Coord::new(4, 4), ElementKind::River, &mut renderer);
        let found = find_nearest(&grid, Coord::new(5, 5), ElementKind::River).unwrap();
        assert_eq!(found.coord, Coord::new(4, 4));
    }

    #[test]
    fn not_found_terminates() {
        let grid = plain_grid(6, 3);
        assert_eq!(find_nearest(&grid, Coord::new(0, 0), ElementKind::Settlement), None);
        assert_eq!(find_nearest(&grid, Coord::new(-3, 0), ElementKind::Settlement), None);
    }

    #[test]
    fn searches_past_near_border() {
        let mut grid = plain_grid(20, 3);
        let mut renderer = HandleAllocator::new();
        grid.add_element(Coord::new(19, 1), ElementKind::Path, &mut renderer);
        let found = find_nearest(&grid, Coord::new(0, 1), ElementKind::Path).unwrap();
        assert_eq!(found.coord, Coord::new(19, 1));
        assert_eq!(found.radius, 19);
    }
}
