// src/world.rs
//! Конвейер генерации мира
//!
//! `WorldContext` заменяет глобальное состояние: он владеет сеткой и единственным
//! генератором случайных чисел и передаётся по ссылке каждой стадии.
//! Стадии выполняются строго по порядку, каждая использует результат предыдущей:
//!
//! 1. Карта высот и классификация почв
//! 2. Гидрология (реки и озёра)
//! 3. Леса вдоль рек
//! 4. Поселения и вырубка леса вокруг них
//! 5. Дороги между поселениями

use crate::biome::{GroundType, classify_grid};
use crate::config::GenerationConfig;
use crate::error::{GenError, Result};
use crate::grid::{Coord, ElementKind, SpatialGrid};
use crate::heightmap::generate_heightmap;
use crate::hydrology::{Hydrology, run_hydrology};
use crate::network::build_path_network;
use crate::render::ElementRenderer;
use crate::settlement::{clear_forests_near, place_settlements};
use crate::vegetation::grow_forests;
use petgraph::graph::UnGraph;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Контекст одного запуска генерации
pub struct WorldContext<'a> {
    config: &'a GenerationConfig,
    grid: SpatialGrid,
    rng: ChaCha8Rng,
    renderer: &'a mut dyn ElementRenderer,
    diagnostics: Vec<GenError>,
}

impl<'a> WorldContext<'a> {
    /// Проверяет конфигурацию, строит карту высот и классифицирует почвы
    pub fn new(config: &'a GenerationConfig, renderer: &'a mut dyn ElementRenderer) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let (heightmap, gradient) = generate_heightmap(config, &mut rng);
        let grid = classify_grid(&heightmap, &gradient, &config.elevation_bands);

        let (min, max) = heightmap.range();
        info!(
            "Карта высот {}×{}: от {:.2} до {:.2}",
            config.width, config.length, min, max
        );

        Ok(Self {
            config,
            grid,
            rng,
            renderer,
            diagnostics: Vec::new(),
        })
    }

    #[must_use]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn run_hydrology(&mut self) -> Hydrology {
        run_hydrology(
            &mut self.grid,
            &mut self.rng,
            &mut *self.renderer,
            self.config.river_count,
            self.config.river_step_limit(),
            &self.config.hydrology,
        )
    }

    /// Выращивает леса от всех клеток, которые сейчас несут реку
    pub fn run_vegetation(&mut self) -> Vec<Coord> {
        let rivers = self.grid.cells_with(ElementKind::River);
        let forests = grow_forests(
            &self.grid,
            &rivers,
            &self.config.forest_allowed_grounds,
            &self.config.vegetation,
            &mut self.rng,
        );
        for &c in &forests {
            self.grid.add_element(c, ElementKind::Forest, &mut *self.renderer);
        }
        info!("Леса: {} клеток", forests.len());
        forests
    }

    /// Размещает поселения у рек и вырубает лес вокруг них
    pub fn run_settlements(&mut self) -> Vec<Coord> {
        let mut pool = self.grid.cells_with(ElementKind::River);
        let report = place_settlements(
            &self.grid,
            &mut pool,
            &self.config.settlement_allowed_grounds,
            &self.config.settlements,
            &mut self.rng,
        );
        self.diagnostics.extend(report.failures);

        for &c in &report.settlements {
            self.grid
                .add_element(c, ElementKind::Settlement, &mut *self.renderer);
        }

        let cleared = clear_forests_near(
            &mut self.grid,
            &report.settlements,
            self.config.settlements.clearing_radius,
            &mut *self.renderer,
        );
        info!("Вырублено лесных клеток: {}", cleared);

        report.settlements
    }

    /// Прокладывает дороги и отмечает их клетки
    pub fn run_paths(&mut self, settlements: &[Coord]) -> (Vec<Vec<Coord>>, UnGraph<Coord, f32>) {
        let network = build_path_network(&self.grid, settlements, self.config.paths.selection);
        self.diagnostics.extend(network.failures);

        for path in &network.paths {
            for &c in path {
                self.grid.add_element(c, ElementKind::Path, &mut *self.renderer);
            }
        }
        (network.paths, network.roads)
    }

    fn into_parts(self) -> (SpatialGrid, Vec<GenError>) {
        (self.grid, self.diagnostics)
    }
}

/// Результат генерации
#[derive(Debug)]
pub struct World {
    pub grid: SpatialGrid,
    /// Ломаные рек от истока к устью
    pub rivers: Vec<Vec<Coord>>,
    pub lakes: Vec<Vec<Coord>>,
    /// Клетки леса, уцелевшие после вырубки
    pub forests: Vec<Coord>,
    pub settlements: Vec<Coord>,
    pub paths: Vec<Vec<Coord>>,
    /// Граф дорог: поселения и успешно соединённые пары
    pub roads: UnGraph<Coord, f32>,
    /// Нефатальные сбои стадий
    pub diagnostics: Vec<GenError>,
}

#[derive(Serialize)]
struct WorldExport<'a> {
    width: u32,
    length: u32,
    heights: Vec<f32>,
    grounds: Vec<GroundType>,
    rivers: &'a [Vec<Coord>],
    lakes: &'a [Vec<Coord>],
    forests: &'a [Coord],
    settlements: &'a [Coord],
    paths: &'a [Vec<Coord>],
    diagnostics: Vec<String>,
}

impl World {
    /// Сохраняет мир в JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let export = WorldExport {
            width: self.grid.width(),
            length: self.grid.length(),
            heights: self.grid.heights(),
            grounds: self.grid.grounds(),
            rivers: &self.rivers,
            lakes: &self.lakes,
            forests: &self.forests,
            settlements: &self.settlements,
            paths: &self.paths,
            diagnostics: self.diagnostics.iter().map(ToString::to_string).collect(),
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &export)?;
        Ok(())
    }
}

/// Генерирует мир целиком
///
/// Одинаковые конфигурация и сид дают одинаковый мир.
pub fn generate_world(
    config: &GenerationConfig,
    renderer: &mut dyn ElementRenderer,
) -> Result<World> {
    let mut ctx = WorldContext::new(config, renderer)?;

    let hydrology = ctx.run_hydrology();
    let mut forests = ctx.run_vegetation();
    let settlements = ctx.run_settlements();
    let (paths, roads) = ctx.run_paths(&settlements);

    forests.retain(|&c| ctx.grid().has_element(c, ElementKind::Forest));

    let (grid, diagnostics) = ctx.into_parts();
    info!(
        "Мир готов: {} рек, {} озёр, {} поселений, {} дорог, {} предупреждений",
        hydrology.rivers.len(),
        hydrology.lakes.len(),
        settlements.len(),
        paths.len(),
        diagnostics.len()
    );

    Ok(World {
        grid,
        rivers: hydrology.rivers,
        lakes: hydrology.lakes,
        forests,
        settlements,
        paths,
        roads,
        diagnostics,
    })
}
