// src/vegetation.rs
//! Рост лесов вдоль рек
//!
//! Фронтир стартует со строгих соседей всех клеток рек. Каждая клетка фронтира
//! принимается с вероятностью, которая падает с расстоянием до ближайшей реки
//! и растёт с числом соседей, уже ставших лесом. Принятая клетка добавляет во фронтир
//! своих соседей с разрешённой почвой.

use crate::biome::GroundType;
use crate::config::VegetationSettings;
use crate::grid::{Coord, ElementKind, SpatialGrid};
use crate::neighbors::{lowest_strict_neighbors, strict_neighbors};
use crate::proximity::find_nearest;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Шанс превратить клетку в лес.
///
/// Значение не ограничивается: всё, что ≥ 1, принимается всегда, ≤ 0 не принимается никогда,
/// это обеспечивает само сравнение `roll < chance`.
#[must_use]
pub fn forest_chance(distance: f32, forest_neighbors: usize, settings: &VegetationSettings) -> f32 {
    1.0 - settings.distance_penalty * distance + settings.neighbor_bonus * forest_neighbors as f32
}

/// Выращивает леса. Сетка должна уже содержать элементы рек.
///
/// Возвращает клетки леса в порядке принятия. Почва каждой принятой клетки
/// входит в `allowed` на момент принятия.
pub fn grow_forests<R: Rng>(
    grid: &SpatialGrid,
    rivers: &[Coord],
    allowed: &[GroundType],
    settings: &VegetationSettings,
    rng: &mut R,
) -> Vec<Coord> {
    let is_allowed = |c: Coord| grid.ground(c).is_some_and(|g| allowed.contains(&g));

    let river_set: HashSet<Coord> = rivers.iter().copied().collect();
    let mut queued = HashSet::new();
    let mut frontier: VecDeque<Coord> = rivers
        .iter()
        .flat_map(|&r| lowest_strict_neighbors(grid, r))
        .filter(|c| !river_set.contains(c) && is_allowed(*c) && queued.insert(*c))
        .collect();

    let mut forest = Vec::new();
    let mut in_forest = HashSet::new();

    for _ in 0..settings.max_steps {
        let Some(candidate) = frontier.pop_front() else {
            break;
        };
        if in_forest.contains(&candidate) {
            continue;
        }
        let Some(river) = find_nearest(grid, candidate, ElementKind::River) else {
            continue;
        };

        let forest_neighbors = strict_neighbors(grid, candidate)
            .into_iter()
            .filter(|n| in_forest.contains(n))
            .count();
        let chance = forest_chance(candidate.distance(river.coord), forest_neighbors, settings);

        let roll: f32 = rng.gen_range(0.0..1.0);
        if roll < chance {
            forest.push(candidate);
            in_forest.insert(candidate);

            for next in lowest_strict_neighbors(grid, candidate) {
                if !in_forest.contains(&next) && is_allowed(next) {
                    frontier.push_back(next);
                }
            }
        }
    }

    debug!("Лес: {} клеток, во фронтире осталось {}", forest.len(), frontier.len());
    forest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::classify_grid;
    use crate::config::ElevationBands;
    use crate::heightmap::{GradientField, Heightmap};
    use crate::render::HandleAllocator;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn grid_with_river(width: u32, length: u32, data: Vec<f32>, river: &[Coord]) -> SpatialGrid {
        let hm = Heightmap::from_data(width, length, data);
        let mut grid =
            classify_grid(&hm, &GradientField::flat(width, length), &ElevationBands::default());
        let mut renderer = HandleAllocator::new();
        for &c in river {
            grid.add_element(c, ElementKind::River, &mut renderer);
        }
        grid
    }

    #[test]
    fn chance_is_unclamped() {
        let settings = VegetationSettings::default();
        assert_relative_eq!(forest_chance(1.0, 0, &settings), 0.8, epsilon = 1e-6);
        assert_relative_eq!(forest_chance(1.0, 2, &settings), 0.87, epsilon = 1e-6);
        assert!(forest_chance(10.0, 0, &settings) < 0.0);
        assert!(forest_chance(0.0, 4, &settings) > 1.0);
    }

    #[test]
    fn certain_acceptance_covers_reachable_allowed_cells() {
        // Без штрафа за расстояние шанс всегда ≥ 1
        let settings = VegetationSettings {
            distance_penalty: 0.0,
            ..VegetationSettings::default()
        };
        let river = [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)];
        let grid = grid_with_river(4, 3, vec![5.0; 12], &river);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let forest = grow_forests(&grid, &river, &[GroundType::Plains], &settings, &mut rng);
        let unique: HashSet<_> = forest.iter().copied().collect();
        assert_eq!(unique.len(), forest.len());
        // при расширении лес может занять и саму реку, но соседние столбцы обязательны
        for x in 1..4 {
            for y in 0..3 {
                assert!(unique.contains(&Coord::new(x, y)));
            }
        }
    }

    #[test]
    fn impossible_acceptance_yields_nothing() {
        let settings = VegetationSettings {
            distance_penalty: 5.0,
            neighbor_bonus: 0.0,
            ..VegetationSettings::default()
        };
        let river = [Coord::new(1, 1)];
        let grid = grid_with_river(3, 3, vec![5.0; 9], &river);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let forest = grow_forests(&grid, &river, &[GroundType::Plains], &settings, &mut rng);
        assert!(forest.is_empty());
    }

    #[test]
    fn forest_stays_on_allowed_grounds() {
        // левая половина — равнины, правая — высокогорья
        let data = (0..6)
            .flat_map(|_| (0..6).map(|x| if x < 3 { 5.0 } else { 25.0 }))
            .collect();
        let river: Vec<Coord> = (0..6).map(|y| Coord::new(2, y)).collect();
        let grid = grid_with_river(6, 6, data, &river);
        let settings = VegetationSettings {
            distance_penalty: 0.0,
            ..VegetationSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let forest = grow_forests(&grid, &river, &[GroundType::Plains], &settings, &mut rng);

        assert!(!forest.is_empty());
        for c in forest {
            assert_eq!(grid.ground(c), Some(GroundType::Plains));
        }
    }

    #[test]
    fn no_rivers_no_forest() {
        let grid = grid_with_river(3, 3, vec![5.0; 9], &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let forest = grow_forests(
            &grid,
            &[],
            &[GroundType::Plains],
            &VegetationSettings::default(),
            &mut rng,
        );
        assert!(forest.is_empty());
    }
}
