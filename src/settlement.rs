// src/settlement.rs
//! Размещение поселений у рек
//!
//! Кандидат берётся из пула клеток рек, место под поселение ищется среди его строгих соседей.
//! Место принимается, если в круге радиуса `survey_radius` есть хотя бы один камень
//! (склон или горы) и не меньше `min_fields` свободных полей (разрешённая почва без реки и леса).

use crate::biome::GroundType;
use crate::config::SettlementSettings;
use crate::error::GenError;
use crate::grid::{Coord, ElementKind, SpatialGrid};
use crate::neighbors::lowest_strict_neighbors;
use crate::render::ElementRenderer;
use rand::Rng;
use tracing::{debug, info, warn};

/// Подсчёт ресурсов вокруг места
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiteSurvey {
    pub stone_count: usize,
    pub field_count: usize,
}

impl SiteSurvey {
    #[must_use]
    pub fn is_acceptable(&self, min_fields: usize) -> bool {
        self.stone_count > 0 && self.field_count >= min_fields
    }
}

/// Клетки сетки в евклидовом круге радиуса `radius` вокруг `center`
pub fn disk(grid: &SpatialGrid, center: Coord, radius: u32) -> impl Iterator<Item = Coord> + '_ {
    let r = radius as i32;
    (-r..=r)
        .flat_map(move |dx| (-r..=r).map(move |dy| (dx, dy)))
        .filter(move |&(dx, dy)| dx * dx + dy * dy <= r * r)
        .map(move |(dx, dy)| center.offset(dx, dy))
        .filter(move |&c| grid.in_bounds(c))
}

/// Считает камни и свободные поля вокруг `site`
#[must_use]
pub fn survey_site(
    grid: &SpatialGrid,
    site: Coord,
    allowed: &[GroundType],
    radius: u32,
) -> SiteSurvey {
    let mut survey = SiteSurvey::default();
    for c in disk(grid, site, radius) {
        let Some(cell) = grid.get(c) else {
            continue;
        };
        let ground = cell.ground();
        if ground.is_stone() {
            survey.stone_count += 1;
        } else if allowed.contains(&ground)
            && !cell.has(ElementKind::River)
            && !cell.has(ElementKind::Forest)
        {
            survey.field_count += 1;
        }
    }
    survey
}

/// Первый по высоте строгий сосед клетки реки с разрешённой почвой и без реки
#[must_use]
pub fn select_site(grid: &SpatialGrid, river: Coord, allowed: &[GroundType]) -> Option<Coord> {
    lowest_strict_neighbors(grid, river).into_iter().find(|&n| {
        grid.get(n)
            .is_some_and(|cell| allowed.contains(&cell.ground()) && !cell.has(ElementKind::River))
    })
}

/// Итог размещения
#[derive(Debug, Default)]
pub struct SettlementReport {
    pub settlements: Vec<Coord>,
    /// Сколько мест не прошло проверку
    pub rejected: usize,
    /// Клетки рек, рядом с которыми вообще нет места
    pub failures: Vec<GenError>,
}

/// Размещает до `settings.count` поселений.
///
/// Каждая попытка расходует одну случайную клетку из `pool`. Отклонённое место
/// не уменьшает число оставшихся поселений. Когда пул пуст, размещение заканчивается.
pub fn place_settlements<R: Rng>(
    grid: &SpatialGrid,
    pool: &mut Vec<Coord>,
    allowed: &[GroundType],
    settings: &SettlementSettings,
    rng: &mut R,
) -> SettlementReport {
    let mut report = SettlementReport::default();

    while report.settlements.len() < settings.count && !pool.is_empty() {
        let river = pool.swap_remove(rng.gen_range(0..pool.len()));

        let Some(site) = select_site(grid, river, allowed) else {
            warn!("У клетки реки {} нет места под поселение", river);
            report.failures.push(GenError::NoSettlementSite { river });
            continue;
        };

        if report.settlements.contains(&site) {
            report.rejected += 1;
            continue;
        }

        let survey = survey_site(grid, site, allowed, settings.survey_radius);
        if survey.is_acceptable(settings.min_fields) {
            debug!(
                "Поселение в {}: камней {}, полей {}",
                site, survey.stone_count, survey.field_count
            );
            report.settlements.push(site);
        } else {
            report.rejected += 1;
        }
    }

    info!(
        "Поселения: {} из {}, отклонено мест {}",
        report.settlements.len(),
        settings.count,
        report.rejected
    );
    report
}

/// Вырубает лес в радиусе `radius` вокруг каждого поселения. Возвращает число удалённых элементов.
pub fn clear_forests_near(
    grid: &mut SpatialGrid,
    settlements: &[Coord],
    radius: u32,
    renderer: &mut dyn ElementRenderer,
) -> usize {
    let mut removed = 0;
    for &site in settlements {
        let area: Vec<Coord> = disk(grid, site, radius).collect();
        for c in area {
            while grid.remove_element(c, ElementKind::Forest, renderer) {
                removed += 1;
            }
        }
    }
    removed
}
