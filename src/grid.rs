// src/grid.rs
//! Сетка клеток мира
//!
//! `SpatialGrid` владеет массивом `Cell` фиксированного размера W×L, хранящимся построчно
//! (`y * width + x`). Все запросы проверяют границы и возвращают `None` вместо паники.
//!
//! ## Инварианты клетки
//! - Высота и уклон задаются один раз при классификации и больше не меняются
//! - Тип почвы меняется только при затоплении озером (`flood`), которое заодно очищает элементы
//! - Список элементов допускает повторы одного вида (например, две дороги через одну клетку)
//! - Дескрипторы элементов принадлежат внешнему рендереру, клетка лишь ссылается на них

use crate::biome::GroundType;
use crate::heightmap::Slope;
use crate::render::{ElementHandle, ElementRenderer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Координата клетки. Знаковая, чтобы смещения за границу выражались естественно.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Евклидово расстояние
    #[must_use]
    pub fn distance(self, other: Coord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Вид элемента, размещённого в клетке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    River,
    Forest,
    Settlement,
    Path,
}

/// Элемент клетки вместе с дескриптором рендерера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedElement {
    pub kind: ElementKind,
    pub handle: ElementHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    elevation: f32,
    ground: GroundType,
    slope: Slope,
    elements: Vec<PlacedElement>,
}

impl Cell {
    #[must_use]
    pub fn new(elevation: f32, ground: GroundType, slope: Slope) -> Self {
        Self {
            elevation,
            ground,
            slope,
            elements: Vec::new(),
        }
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn ground(&self) -> GroundType {
        self.ground
    }

    pub fn slope(&self) -> Slope {
        self.slope
    }

    pub fn elements(&self) -> &[PlacedElement] {
        &self.elements
    }

    /// Виды элементов в порядке добавления
    pub fn element_kinds(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.elements.iter().map(|e| e.kind)
    }

    pub fn has(&self, kind: ElementKind) -> bool {
        self.elements.iter().any(|e| e.kind == kind)
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialGrid {
    width: u32,
    length: u32,
    cells: Vec<Cell>,
}

impl SpatialGrid {
    /// # Panics
    /// Если количество клеток не равно `width * length`.
    #[must_use]
    pub fn from_cells(width: u32, length: u32, cells: Vec<Cell>) -> Self {
        assert_eq!(
            cells.len(),
            (width as usize) * (length as usize),
            "grid size mismatch"
        );
        Self {
            width,
            length,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.length
    }

    /// Плоский индекс клетки или `None` за границей
    pub fn index(&self, c: Coord) -> Option<usize> {
        self.in_bounds(c)
            .then(|| c.y as usize * self.width as usize + c.x as usize)
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        let width = self.width as usize;
        Coord::new((index % width) as i32, (index / width) as i32)
    }

    pub fn get(&self, c: Coord) -> Option<&Cell> {
        self.index(c).map(|i| &self.cells[i])
    }

    pub fn elevation(&self, c: Coord) -> Option<f32> {
        self.get(c).map(Cell::elevation)
    }

    pub fn ground(&self, c: Coord) -> Option<GroundType> {
        self.get(c).map(Cell::ground)
    }

    pub fn is_water(&self, c: Coord) -> bool {
        self.ground(c) == Some(GroundType::Water)
    }

    pub fn has_element(&self, c: Coord, kind: ElementKind) -> bool {
        self.get(c).is_some_and(|cell| cell.has(kind))
    }

    /// Все координаты в построчном порядке
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(|i| self.coord_of(i))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Плоская копия высот для потребителей, которым не нужны клетки целиком
    pub fn heights(&self) -> Vec<f32> {
        self.cells.iter().map(Cell::elevation).collect()
    }

    pub fn grounds(&self) -> Vec<GroundType> {
        self.cells.iter().map(Cell::ground).collect()
    }

    /// Координаты клеток, содержащих элемент `kind`
    pub fn cells_with(&self, kind: ElementKind) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.has(kind))
            .map(|(i, _)| self.coord_of(i))
            .collect()
    }

    /// Добавляет элемент и запрашивает для него дескриптор у рендерера.
    /// Возвращает `false`, если клетка за границей.
    pub fn add_element(
        &mut self,
        c: Coord,
        kind: ElementKind,
        renderer: &mut dyn ElementRenderer,
    ) -> bool {
        let Some(idx) = self.index(c) else {
            return false;
        };
        let handle = renderer.bind_element(kind, c);
        self.cells[idx].elements.push(PlacedElement { kind, handle });
        true
    }

    /// Удаляет первое вхождение элемента `kind` и освобождает его дескриптор
    pub fn remove_element(
        &mut self,
        c: Coord,
        kind: ElementKind,
        renderer: &mut dyn ElementRenderer,
    ) -> bool {
        let Some(idx) = self.index(c) else {
            return false;
        };
        let elements = &mut self.cells[idx].elements;
        match elements.iter().position(|e| e.kind == kind) {
            Some(pos) => {
                let removed = elements.remove(pos);
                renderer.release_element(removed.handle);
                true
            }
            None => false,
        }
    }

    /// Удаляет все элементы клетки. Возвращает количество удалённых.
    pub fn clear_elements(&mut self, c: Coord, renderer: &mut dyn ElementRenderer) -> usize {
        let Some(idx) = self.index(c) else {
            return 0;
        };
        let removed = std::mem::take(&mut self.cells[idx].elements);
        for element in &removed {
            renderer.release_element(element.handle);
        }
        removed.len()
    }

    /// Затопление: клетка становится водой и теряет все элементы
    pub fn flood(&mut self, c: Coord, renderer: &mut dyn ElementRenderer) -> bool {
        let Some(idx) = self.index(c) else {
            return false;
        };
        self.cells[idx].ground = GroundType::Water;
        self.clear_elements(c, renderer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HandleAllocator;

    fn flat_grid(width: u32, length: u32) -> SpatialGrid {
        let cells = (0..width * length)
            .map(|i| Cell::new(i as f32, GroundType::Plains, Slope::default()))
            .collect();
        SpatialGrid::from_cells(width, length, cells)
    }

    #[test]
    fn out_of_bounds_queries_return_none() {
        let grid = flat_grid(3, 2);
        assert!(grid.get(Coord::new(-1, 0)).is_none());
        assert!(grid.get(Coord::new(3, 0)).is_none());
        assert!(grid.get(Coord::new(0, 2)).is_none());
        assert!(grid.elevation(Coord::new(0, -5)).is_none());
        assert_eq!(grid.elevation(Coord::new(2, 1)), Some(5.0));
    }

    #[test]
    fn heights_are_row_major() {
        let grid = flat_grid(3, 2);
        assert_eq!(grid.heights(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(grid.coord_of(4), Coord::new(1, 1));
        assert_eq!(grid.index(Coord::new(1, 1)), Some(4));
    }

    #[test]
    fn elements_bind_and_release_handles() {
        let mut grid = flat_grid(2, 2);
        let mut renderer = HandleAllocator::new();
        let c = Coord::new(1, 0);

        assert!(grid.add_element(c, ElementKind::Path, &mut renderer));
        assert!(grid.add_element(c, ElementKind::Path, &mut renderer));
        assert!(grid.add_element(c, ElementKind::Forest, &mut renderer));
        assert_eq!(grid.get(c).unwrap().count(ElementKind::Path), 2);
        assert_eq!(renderer.live_count(), 3);

        assert!(grid.remove_element(c, ElementKind::Path, &mut renderer));
        assert_eq!(grid.get(c).unwrap().count(ElementKind::Path), 1);
        assert!(!grid.remove_element(c, ElementKind::River, &mut renderer));
        assert_eq!(renderer.live_count(), 2);

        assert!(!grid.add_element(Coord::new(5, 5), ElementKind::River, &mut renderer));
        assert_eq!(renderer.live_count(), 2);
    }

    #[test]
    fn flood_turns_cell_to_water_and_clears_elements() {
        let mut grid = flat_grid(2, 2);
        let mut renderer = HandleAllocator::new();
        let c = Coord::new(0, 1);
        grid.add_element(c, ElementKind::River, &mut renderer);
        grid.add_element(c, ElementKind::Forest, &mut renderer);

        assert!(grid.flood(c, &mut renderer));
        let cell = grid.get(c).unwrap();
        assert_eq!(cell.ground(), GroundType::Water);
        assert!(cell.elements().is_empty());
        // высота не меняется
        assert_eq!(cell.elevation(), 2.0);
        assert_eq!(renderer.live_count(), 0);
        assert_eq!(renderer.released_count(), 2);
    }

    #[test]
    fn cells_with_lists_matching_coords() {
        let mut grid = flat_grid(3, 3);
        let mut renderer = HandleAllocator::new();
        grid.add_element(Coord::new(2, 0), ElementKind::Settlement, &mut renderer);
        grid.add_element(Coord::new(0, 2), ElementKind::Settlement, &mut renderer);
        assert_eq!(
            grid.cells_with(ElementKind::Settlement),
            vec![Coord::new(2, 0), Coord::new(0, 2)]
        );
    }
}
