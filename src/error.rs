// src/error.rs
//! Ошибки генерации мира
//!
//! Фатальные ошибки (конфигурация, ввод-вывод) прерывают генерацию.
//! Локальные сбои (не найден путь, нет места для поселения) не прерывают конвейер:
//! они собираются в `World::diagnostics`, остальная генерация продолжается.

use crate::grid::Coord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// Недопустимые параметры генерации
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize world: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    /// Поиск пути исчерпал открытое множество, не достигнув цели
    #[error("no path from {from} to {to}")]
    PathNotFound { from: Coord, to: Coord },

    /// У клетки реки нет соседа, пригодного под поселение
    #[error("river cell {river} has no neighbour suitable for a settlement")]
    NoSettlementSite { river: Coord },
}

pub type Result<T> = std::result::Result<T, GenError>;
