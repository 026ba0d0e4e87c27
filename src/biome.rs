// src/biome.rs
//! Классификация почвы по высоте и уклону

use crate::config::ElevationBands;
use crate::grid::{Cell, SpatialGrid};
use crate::heightmap::{GradientField, Heightmap};
use serde::{Deserialize, Serialize};

/// Уровень моря: всё, что ниже, становится водой
pub const SEA_LEVEL: f32 = 0.0;

/// Тип почвы клетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroundType {
    Water,
    Slopes,
    Plains,
    HighLands,
    Mountains,
    MountainTop,
}

impl GroundType {
    pub fn to_rgb(&self) -> [u8; 3] {
        match self {
            GroundType::Water => [0, 64, 128],
            GroundType::Slopes => [130, 120, 100],
            GroundType::Plains => [150, 200, 100],
            GroundType::HighLands => [120, 160, 80],
            GroundType::Mountains => [150, 150, 150],
            GroundType::MountainTop => [230, 230, 240],
        }
    }

    /// Каменистая почва: склоны и горы
    #[must_use]
    pub fn is_stone(self) -> bool {
        matches!(self, GroundType::Slopes | GroundType::Mountains)
    }
}

/// Назначает почву одной клетке.
///
/// Порядок проверок: вода, затем склон, затем таблица порогов высот.
#[must_use]
pub fn classify_ground(elevation: f32, slope: f32, bands: &ElevationBands) -> GroundType {
    if elevation < SEA_LEVEL {
        return GroundType::Water;
    }
    if slope >= bands.slope_threshold {
        return GroundType::Slopes;
    }
    bands
        .bands
        .iter()
        .find(|band| elevation < band.below)
        .map_or(bands.top, |band| band.ground)
}

/// Строит сетку клеток из карты высот и поля градиентов
#[must_use]
pub fn classify_grid(
    heightmap: &Heightmap,
    gradient: &GradientField,
    bands: &ElevationBands,
) -> SpatialGrid {
    let cells = heightmap
        .data
        .iter()
        .zip(&gradient.data)
        .map(|(&elevation, &slope)| {
            let ground = classify_ground(elevation, slope.magnitude(), bands);
            Cell::new(elevation, ground, slope)
        })
        .collect();

    SpatialGrid::from_cells(heightmap.width, heightmap.length, cells)
}
