// src/hydrology.rs
//! Реки и озёра
//!
//! Река спускается по самому низкому соседу, пока не упрётся в локальный минимум.
//! В минимуме начинается заливка озера, которая превращает клетки в воду.

use crate::biome::GroundType;
use crate::config::HydrologySettings;
use crate::grid::{Coord, ElementKind, SpatialGrid};
use crate::neighbors::{lowest_neighbors, lowest_strict_neighbors, sort_by_elevation};
use crate::render::ElementRenderer;
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Результат спуска реки
#[derive(Debug, Clone, PartialEq)]
pub struct RiverWalk {
    /// Клетки реки от истока к устью, высота строго убывает
    pub path: Vec<Coord>,
    /// Сосед, с которого начинается озеро, если река упёрлась в минимум
    pub lake_seed: Option<Coord>,
}

/// Спуск по самому крутому склону.
///
/// На каждом шаге соседи сортируются по высоте, берётся первый не водный.
/// Если он не ниже текущей клетки, спуск окончен и сосед становится затравкой озера.
/// Если подходящих соседей нет, река просто обрывается у воды.
#[must_use]
pub fn walk_river(grid: &SpatialGrid, start: Coord, step_limit: usize) -> RiverWalk {
    let mut path = vec![start];
    let mut current = start;

    for _ in 0..step_limit {
        let Some(current_h) = grid.elevation(current) else {
            break;
        };
        let next = lowest_neighbors(grid, current)
            .into_iter()
            .find(|&n| !grid.is_water(n));

        let Some(next) = next else {
            return RiverWalk {
                path,
                lake_seed: None,
            };
        };

        let next_h = grid.elevation(next).unwrap_or(f32::INFINITY);
        if next_h >= current_h {
            return RiverWalk {
                path,
                lake_seed: Some(next),
            };
        }

        path.push(next);
        current = next;
    }

    debug!("Река из {} упёрлась в предел шагов {}", start, step_limit);
    RiverWalk {
        path,
        lake_seed: None,
    }
}

/// Заливка озера от клетки `seed`.
///
/// Из фронтира берётся самая низкая клетка, её строгие соседи добавляются во фронтир.
/// Внутренний проход останавливается, когда самая низкая клетка фронтира выше затравки.
/// Проходы повторяются, пока озеро меньше `min_lake_size`. Если фронтир опустел
/// (озеро заполнило всю доступную область), заливка заканчивается раньше.
#[must_use]
pub fn fill_lake(grid: &SpatialGrid, seed: Coord, settings: &HydrologySettings) -> Vec<Coord> {
    let Some(seed_h) = grid.elevation(seed) else {
        return Vec::new();
    };

    let mut lake = Vec::new();
    let mut in_lake = HashSet::new();
    let mut frontier = vec![seed];

    loop {
        for _ in 0..settings.lake_fill_steps {
            if frontier.is_empty() {
                break;
            }
            let cell = frontier.remove(0);
            lake.push(cell);
            in_lake.insert(cell);

            frontier.extend(lowest_strict_neighbors(grid, cell));
            sort_by_elevation(grid, &mut frontier);
            let mut seen = HashSet::new();
            frontier.retain(|c| !in_lake.contains(c) && seen.insert(*c));

            let overflow = frontier
                .first()
                .and_then(|&c| grid.elevation(c))
                .is_none_or(|h| h > seed_h);
            if overflow {
                break;
            }
        }

        if lake.len() >= settings.min_lake_size || frontier.is_empty() {
            break;
        }
    }

    lake
}

/// Обрезает реку перед первой водной клеткой
#[must_use]
pub fn truncate_at_water(grid: &SpatialGrid, mut path: Vec<Coord>) -> Vec<Coord> {
    if let Some(pos) = path.iter().position(|&c| grid.is_water(c)) {
        path.truncate(pos);
    }
    path
}

/// Реки и озёра, созданные всеми проходами гидрологии.
///
/// Ломаные рек записаны в момент прокладки. Озеро следующего прохода может затопить
/// часть ранее проложенной реки, актуальное состояние хранит сетка.
#[derive(Debug, Clone, Default)]
pub struct Hydrology {
    pub rivers: Vec<Vec<Coord>>,
    pub lakes: Vec<Vec<Coord>>,
}

/// Запускает `river_count` проходов гидрологии, изменяя сетку.
///
/// Исток выбирается равномерно среди не водных клеток. Озеро применяется раньше реки,
/// поэтому река обрезается у своего же озера и не рисуется поверх воды.
pub fn run_hydrology<R: Rng>(
    grid: &mut SpatialGrid,
    rng: &mut R,
    renderer: &mut dyn ElementRenderer,
    river_count: usize,
    step_limit: usize,
    settings: &HydrologySettings,
) -> Hydrology {
    let mut hydrology = Hydrology::default();

    for _ in 0..river_count {
        let land: Vec<Coord> = grid
            .coords()
            .filter(|&c| grid.ground(c) != Some(GroundType::Water))
            .collect();
        if land.is_empty() {
            debug!("Суши не осталось, гидрология остановлена");
            break;
        }
        let start = land[rng.gen_range(0..land.len())];

        let walk = walk_river(grid, start, step_limit);

        if let Some(seed) = walk.lake_seed {
            let lake = fill_lake(grid, seed, settings);
            for &c in &lake {
                grid.flood(c, renderer);
            }
            debug!("Озеро у {}: {} клеток", seed, lake.len());
            hydrology.lakes.push(lake);
        }

        let river = truncate_at_water(grid, walk.path);
        for &c in &river {
            grid.add_element(c, ElementKind::River, renderer);
        }
        debug!("Река из {}: {} клеток", start, river.len());
        hydrology.rivers.push(river);
    }

    info!(
        "Гидрология: {} рек, {} озёр",
        hydrology.rivers.len(),
        hydrology.lakes.len()
    );
    hydrology
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::classify_grid;
    use crate::config::ElevationBands;
    use crate::heightmap::{GradientField, Heightmap};
    use crate::render::HandleAllocator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid_from(width: u32, length: u32, data: Vec<f32>) -> SpatialGrid {
        let hm = Heightmap::from_data(width, length, data);
        classify_grid(&hm, &GradientField::flat(width, length), &ElevationBands::default())
    }

    fn bowl() -> SpatialGrid {
        #[rustfmt::skip]
        let data = vec![
            9.0, 9.0, 9.0, 9.0, 9.0,
            9.0, 7.0, 6.0, 7.0, 9.0,
            9.0, 6.0, 2.0, 5.0, 9.0,
            9.0, 7.0, 6.0, 7.0, 9.0,
            9.0, 9.0, 9.0, 9.0, 9.0,
        ];
        grid_from(5, 5, data)
    }

    #[test]
    fn river_descends_to_local_minimum() {
        let grid = bowl();
        let walk = walk_river(&grid, Coord::new(0, 0), 100);
        assert_eq!(walk.path.first(), Some(&Coord::new(0, 0)));
        assert_eq!(walk.path.last(), Some(&Coord::new(2, 2)));
        assert!(
            walk.path
                .windows(2)
                .all(|w| grid.elevation(w[1]) < grid.elevation(w[0]))
        );
        // самый низкий сосед минимума — (3, 2) с высотой 5
        assert_eq!(walk.lake_seed, Some(Coord::new(3, 2)));
    }

    #[test]
    fn river_stops_at_step_limit() {
        let grid = bowl();
        let walk = walk_river(&grid, Coord::new(0, 0), 1);
        assert_eq!(walk.path.len(), 2);
        assert_eq!(walk.lake_seed, None);
    }

    #[test]
    fn river_ends_without_lake_when_surrounded_by_water() {
        #[rustfmt::skip]
        let data = vec![
            -1.0, -1.0, -1.0,
            -1.0,  5.0, -1.0,
            -1.0, -1.0, -1.0,
        ];
        let grid = grid_from(3, 3, data);
        let walk = walk_river(&grid, Coord::new(1, 1), 10);
        assert_eq!(walk.path, vec![Coord::new(1, 1)]);
        assert_eq!(walk.lake_seed, None);
    }

    #[test]
    fn lake_reaches_minimum_size() {
        let grid = bowl();
        let settings = HydrologySettings {
            min_lake_size: 6,
            ..HydrologySettings::default()
        };
        let lake = fill_lake(&grid, Coord::new(2, 2), &settings);
        assert!(lake.len() >= 6);
        assert_eq!(lake[0], Coord::new(2, 2));
        let unique: HashSet<_> = lake.iter().collect();
        assert_eq!(unique.len(), lake.len());
    }

    #[test]
    fn lake_stops_at_grid_boundary() {
        let grid = grid_from(2, 1, vec![1.0, 1.0]);
        let settings = HydrologySettings {
            min_lake_size: 50,
            ..HydrologySettings::default()
        };
        let lake = fill_lake(&grid, Coord::new(0, 0), &settings);
        assert_eq!(lake.len(), 2);
    }

    #[test]
    fn lake_fills_plateau_below_seed_level() {
        // Плато с ямой: всё, что не выше затравки, уходит под воду
        #[rustfmt::skip]
        let data = vec![
            3.0, 3.0, 8.0,
            3.0, 1.0, 8.0,
            8.0, 8.0, 8.0,
        ];
        let grid = grid_from(3, 3, data);
        let settings = HydrologySettings {
            min_lake_size: 1,
            ..HydrologySettings::default()
        };
        let mut lake = fill_lake(&grid, Coord::new(0, 0), &settings);
        lake.sort();
        assert_eq!(
            lake,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 1)
            ]
        );
    }

    #[test]
    fn later_rivers_do_not_overdraw_water() {
        let mut grid = bowl();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut renderer = HandleAllocator::new();
        let hydrology = run_hydrology(
            &mut grid,
            &mut rng,
            &mut renderer,
            5,
            100,
            &HydrologySettings::default(),
        );

        assert!(!hydrology.rivers.is_empty());
        assert!(hydrology.rivers.len() <= 5);
        for lake in &hydrology.lakes {
            for &c in lake {
                assert!(grid.is_water(c));
            }
        }
        // вода никогда не несёт элементов, реки лежат только на суше
        assert!(grid.cells().iter().all(|cell| {
            cell.ground() != GroundType::Water || cell.elements().is_empty()
        }));
        for c in grid.cells_with(ElementKind::River) {
            assert!(!grid.is_water(c));
        }
        assert_eq!(
            renderer.live_count(),
            grid.cells().iter().map(|cell| cell.elements().len()).sum::<usize>()
        );
    }

    #[test]
    fn truncation_cuts_before_first_water_cell() {
        let grid = grid_from(4, 1, vec![5.0, 4.0, -1.0, 3.0]);
        let path = vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0), Coord::new(3, 0)];
        assert_eq!(
            truncate_at_water(&grid, path),
            vec![Coord::new(0, 0), Coord::new(1, 0)]
        );
    }
}
