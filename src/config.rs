// src/config.rs
//! Конфигурация генерации мира
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размеры сетки и диапазон высот
//! - Таблицу порогов высот для классификации почвы
//! - Параметры гидрологии (реки и озёра)
//! - Параметры роста лесов, размещения поселений и прокладки дорог
//!
//! Все структуры поддерживают сериализацию в TOML/JSON. Конфигурация неизменна на время запуска.

use crate::biome::GroundType;
use crate::error::{GenError, Result};
use crate::pathfinding::FrontierSelection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Одна строка таблицы порогов: всё, что ниже `below`, получает почву `ground`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ElevationBand {
    pub below: f32,
    pub ground: GroundType,
}

/// Упорядоченная таблица порогов высот
///
/// Просматривается сверху вниз, первая подходящая строка побеждает.
/// Высоты не ниже последнего порога получают `top`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElevationBands {
    /// Модуль уклона, начиная с которого клетка считается склоном
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: f32,

    #[serde(default = "default_bands")]
    pub bands: Vec<ElevationBand>,

    #[serde(default = "default_top_ground")]
    pub top: GroundType,
}

fn default_slope_threshold() -> f32 {
    1.0
}
fn default_bands() -> Vec<ElevationBand> {
    vec![
        ElevationBand {
            below: 20.0,
            ground: GroundType::Plains,
        },
        ElevationBand {
            below: 40.0,
            ground: GroundType::HighLands,
        },
        ElevationBand {
            below: 60.0,
            ground: GroundType::Mountains,
        },
    ]
}
fn default_top_ground() -> GroundType {
    GroundType::MountainTop
}

impl Default for ElevationBands {
    fn default() -> Self {
        Self {
            slope_threshold: default_slope_threshold(),
            bands: default_bands(),
            top: default_top_ground(),
        }
    }
}

/// Настройки рек и озёр
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HydrologySettings {
    /// Минимальная площадь озера в клетках
    #[serde(default = "default_min_lake_size")]
    pub min_lake_size: usize,

    /// Сколько клеток заливка озера может поглотить за один проход
    #[serde(default = "default_lake_fill_steps")]
    pub lake_fill_steps: usize,

    /// Жёсткий предел длины реки (0 = площадь сетки)
    #[serde(default)]
    pub river_step_limit: usize,
}

fn default_min_lake_size() -> usize {
    4
}
fn default_lake_fill_steps() -> usize {
    1000
}

impl Default for HydrologySettings {
    fn default() -> Self {
        Self {
            min_lake_size: 4,
            lake_fill_steps: 1000,
            river_step_limit: 0,
        }
    }
}

/// Настройки роста лесов
///
/// Шанс принять клетку: `1 - distance_penalty · d + neighbor_bonus · n`,
/// где `d` — расстояние до ближайшей реки, `n` — число соседей, уже ставших лесом.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VegetationSettings {
    #[serde(default = "default_distance_penalty")]
    pub distance_penalty: f32,

    #[serde(default = "default_neighbor_bonus")]
    pub neighbor_bonus: f32,

    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_distance_penalty() -> f32 {
    0.2
}
fn default_neighbor_bonus() -> f32 {
    0.035
}
fn default_max_steps() -> usize {
    10_000
}

impl Default for VegetationSettings {
    fn default() -> Self {
        Self {
            distance_penalty: 0.2,
            neighbor_bonus: 0.035,
            max_steps: 10_000,
        }
    }
}

/// Настройки размещения поселений
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementSettings {
    /// Желаемое количество поселений
    #[serde(default = "default_settlement_count")]
    pub count: usize,

    /// Радиус круга, в котором считаются камни и поля
    #[serde(default = "default_survey_radius")]
    pub survey_radius: u32,

    /// Минимум свободных полей вокруг поселения
    #[serde(default = "default_min_fields")]
    pub min_fields: usize,

    /// Радиус вырубки леса вокруг принятого поселения
    #[serde(default = "default_clearing_radius")]
    pub clearing_radius: u32,
}

fn default_settlement_count() -> usize {
    5
}
fn default_survey_radius() -> u32 {
    4
}
fn default_min_fields() -> usize {
    4
}
fn default_clearing_radius() -> u32 {
    2
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            count: 5,
            survey_radius: 4,
            min_fields: 4,
            clearing_radius: 2,
        }
    }
}

/// Настройки дорожной сети
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PathSettings {
    /// Правило выбора клетки из открытого множества A*
    #[serde(default)]
    pub selection: FrontierSelection,
}

/// Основные параметры генерации мира
///
/// Полная конфигурация одного запуска. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Сид генератора случайных чисел (детерминированная генерация)
    pub seed: u64,

    /// Ширина сетки в клетках
    #[serde(default = "default_width")]
    pub width: u32,

    /// Длина сетки в клетках
    #[serde(default = "default_length")]
    pub length: u32,

    /// Нижняя граница высот после нормализации (всё ниже нуля — вода)
    #[serde(default = "default_min_elevation")]
    pub min_elevation: f32,

    /// Верхняя граница высот после нормализации
    #[serde(default = "default_max_elevation")]
    pub max_elevation: f32,

    /// Базовый масштаб шума: частота первой октавы
    #[serde(default = "default_base_scale")]
    pub base_scale: f32,

    /// Размер клетки для центральных разностей (по умолчанию равен `base_scale`)
    #[serde(default)]
    pub cell_size: Option<f32>,

    /// Сила эрозии крутых пиков: `h *= 1 - erosion_factor · |grad|²`
    #[serde(default = "default_erosion_factor")]
    pub erosion_factor: f32,

    /// Количество рек
    #[serde(default = "default_river_count")]
    pub river_count: usize,

    /// Почвы, на которых может расти лес
    #[serde(default = "default_forest_grounds")]
    pub forest_allowed_grounds: Vec<GroundType>,

    /// Почвы, пригодные для поселений и полей вокруг них
    #[serde(default = "default_settlement_grounds")]
    pub settlement_allowed_grounds: Vec<GroundType>,

    #[serde(default)]
    pub elevation_bands: ElevationBands,

    #[serde(default)]
    pub hydrology: HydrologySettings,

    #[serde(default)]
    pub vegetation: VegetationSettings,

    #[serde(default)]
    pub settlements: SettlementSettings,

    #[serde(default)]
    pub paths: PathSettings,
}

impl GenerationConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 96
    /// length = 64
    /// river_count = 6
    ///
    /// [settlements]
    /// count = 8
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Размер клетки, используемый при расчёте градиента
    #[must_use]
    pub fn effective_cell_size(&self) -> f32 {
        self.cell_size.unwrap_or(self.base_scale)
    }

    /// Жёсткий предел шагов реки
    #[must_use]
    pub fn river_step_limit(&self) -> usize {
        match self.hydrology.river_step_limit {
            0 => (self.width as usize) * (self.length as usize),
            limit => limit,
        }
    }

    /// Проверяет согласованность параметров
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.length == 0 {
            return Err(GenError::InvalidConfig(format!(
                "grid size must be positive, got {}x{}",
                self.width, self.length
            )));
        }
        if self.min_elevation.is_nan()
            || self.max_elevation.is_nan()
            || self.min_elevation >= self.max_elevation
        {
            return Err(GenError::InvalidConfig(format!(
                "min_elevation ({}) must be below max_elevation ({})",
                self.min_elevation, self.max_elevation
            )));
        }
        if self.base_scale.is_nan() || self.base_scale <= 0.0 {
            return Err(GenError::InvalidConfig(format!(
                "base_scale must be positive, got {}",
                self.base_scale
            )));
        }
        let cell_size = self.effective_cell_size();
        if cell_size.is_nan() || cell_size <= 0.0 {
            return Err(GenError::InvalidConfig(format!(
                "cell_size must be positive, got {cell_size}"
            )));
        }
        let ascending = self
            .elevation_bands
            .bands
            .windows(2)
            .all(|w| w[0].below < w[1].below);
        if !ascending {
            return Err(GenError::InvalidConfig(
                "elevation bands must be strictly ascending".to_string(),
            ));
        }
        if self.hydrology.lake_fill_steps == 0 {
            return Err(GenError::InvalidConfig(
                "lake_fill_steps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_width() -> u32 {
    96
}
fn default_length() -> u32 {
    64
}
fn default_min_elevation() -> f32 {
    -10.0
}
fn default_max_elevation() -> f32 {
    80.0
}
fn default_base_scale() -> f32 {
    6.0
}
fn default_erosion_factor() -> f32 {
    0.2
}
fn default_river_count() -> usize {
    6
}
fn default_forest_grounds() -> Vec<GroundType> {
    vec![GroundType::Plains]
}
fn default_settlement_grounds() -> Vec<GroundType> {
    vec![GroundType::Plains, GroundType::HighLands]
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            width: default_width(),
            length: default_length(),
            min_elevation: default_min_elevation(),
            max_elevation: default_max_elevation(),
            base_scale: default_base_scale(),
            cell_size: None,
            erosion_factor: default_erosion_factor(),
            river_count: default_river_count(),
            forest_allowed_grounds: default_forest_grounds(),
            settlement_allowed_grounds: default_settlement_grounds(),
            elevation_bands: ElevationBands::default(),
            hydrology: HydrologySettings::default(),
            vegetation: VegetationSettings::default(),
            settlements: SettlementSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config = GenerationConfig::from_toml_str("seed = 7").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.width, 96);
        assert_eq!(config.hydrology.min_lake_size, 4);
        assert_eq!(config.elevation_bands, ElevationBands::default());
        assert_eq!(config.paths.selection, FrontierSelection::Heuristic);
        assert_eq!(config.effective_cell_size(), config.base_scale);
    }

    #[test]
    fn nested_tables_and_ground_names_parse() {
        let toml = r#"
            seed = 3
            width = 32
            length = 16
            forest_allowed_grounds = ["plains", "highLands"]

            [settlements]
            count = 2

            [paths]
            selection = "total_cost"

            [elevation_bands]
            slope_threshold = 0.5
            top = "mountains"
            bands = [
                { below = 10.0, ground = "plains" },
                { below = 30.0, ground = "highLands" },
            ]
        "#;
        let config = GenerationConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.forest_allowed_grounds,
            vec![GroundType::Plains, GroundType::HighLands]
        );
        assert_eq!(config.settlements.count, 2);
        assert_eq!(config.settlements.survey_radius, 4);
        assert_eq!(config.paths.selection, FrontierSelection::TotalCost);
        assert_eq!(config.elevation_bands.bands.len(), 2);
        assert_eq!(config.elevation_bands.top, GroundType::Mountains);
    }

    #[test]
    fn rejects_inverted_elevation_range() {
        let config = GenerationConfig {
            min_elevation: 50.0,
            max_elevation: 10.0,
            ..GenerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_grid_and_unsorted_bands() {
        let config = GenerationConfig {
            width: 0,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::default();
        config.elevation_bands.bands.reverse();
        assert!(config.validate().is_err());
    }

    #[test]
    fn auto_river_limit_is_grid_area() {
        let config = GenerationConfig {
            width: 10,
            length: 5,
            ..GenerationConfig::default()
        };
        assert_eq!(config.river_step_limit(), 50);
    }
}
