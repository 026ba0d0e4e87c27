// src/preview.rs
//! Отладочная визуализация мира в PNG
//!
//! Каждая клетка рисуется квадратом `scale × scale` пикселей:
//! - Цвет почвы берётся из `GroundType::to_rgb` и затеняется по высоте
//!   (самая низкая клетка сетки в 0.6 яркости, самая высокая в полной)
//! - Реки и леса перекрашивают клетку целиком
//! - Дороги рисуются отрезками между центрами клеток
//! - Поселения рисуются кругами поверх всего остального
//!
//! Модуль ничего не знает о настоящем рендерере сцены и используется только для отладки.

use crate::error::Result;
use crate::grid::{Coord, ElementKind};
use crate::world::World;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;

const RIVER_COLOR: Rgba<u8> = Rgba([40, 90, 220, 255]);
const FOREST_COLOR: Rgba<u8> = Rgba([20, 100, 30, 255]);
const PATH_COLOR: Rgba<u8> = Rgba([150, 110, 60, 255]);
const SETTLEMENT_COLOR: Rgba<u8> = Rgba([200, 30, 30, 255]);

fn shade(rgb: [u8; 3], factor: f32) -> Rgba<u8> {
    let [r, g, b] = rgb.map(|c| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8);
    Rgba([r, g, b, 255])
}

fn cell_center(c: Coord, scale: u32) -> (f32, f32) {
    let half = scale as f32 / 2.0;
    (
        c.x as f32 * scale as f32 + half,
        c.y as f32 * scale as f32 + half,
    )
}

/// Рисует мир в RGBA-изображение размером `(width · scale) × (length · scale)`.
///
/// `scale` меньше 1 считается равным 1.
#[must_use]
pub fn render_preview(world: &World, scale: u32) -> RgbaImage {
    let scale = scale.max(1);
    let grid = &world.grid;
    let mut img = RgbaImage::new(grid.width() * scale, grid.length() * scale);

    let heights = grid.heights();
    let (min, max) = heights
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
            (lo.min(h), hi.max(h))
        });
    let span = (max - min).max(f32::EPSILON);

    for c in grid.coords() {
        let Some(cell) = grid.get(c) else {
            continue;
        };
        let color = if cell.has(ElementKind::River) {
            RIVER_COLOR
        } else if cell.has(ElementKind::Forest) {
            FOREST_COLOR
        } else {
            let t = (cell.elevation() - min) / span;
            shade(cell.ground().to_rgb(), 0.6 + 0.4 * t)
        };
        let rect = Rect::at(c.x * scale as i32, c.y * scale as i32).of_size(scale, scale);
        draw_filled_rect_mut(&mut img, rect, color);
    }

    for path in &world.paths {
        for w in path.windows(2) {
            draw_line_segment_mut(
                &mut img,
                cell_center(w[0], scale),
                cell_center(w[1], scale),
                PATH_COLOR,
            );
        }
    }

    let radius = (scale as i32).max(2);
    for &s in &world.settlements {
        let (cx, cy) = cell_center(s, scale);
        draw_filled_circle_mut(&mut img, (cx as i32, cy as i32), radius, SETTLEMENT_COLOR);
    }

    img
}

/// Сохраняет превью мира в PNG
pub fn save_preview(world: &World, path: impl AsRef<Path>, scale: u32) -> Result<()> {
    render_preview(world, scale).save(path)?;
    Ok(())
}
