use crate::config::GenerationConfig;
use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Количество октав шума
const OCTAVES: usize = 4;

/// Диапазон случайного сдвига фазы шума
const NOISE_PHASE_RANGE: f32 = 1000.0;

/// Двумерная карта высот в диапазоне `[min_elevation, max_elevation]`
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub width: u32,
    pub length: u32,
    pub data: Vec<f32>,
}

impl Heightmap {
    pub fn new(width: u32, length: u32) -> Self {
        Self {
            width,
            length,
            data: vec![0.0; (width * length) as usize],
        }
    }

    /// Оборачивает готовые данные (построчно, `y * width + x`)
    ///
    /// # Panics
    /// Если длина `data` не равна `width * length`.
    pub fn from_data(width: u32, length: u32, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (width * length) as usize, "heightmap size mismatch");
        Self {
            width,
            length,
            data,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Минимум и максимум по всей карте
    pub fn range(&self) -> (f32, f32) {
        let min_h = self.data.iter().fold(f32::INFINITY, |a, &b| a.min(b));
        let max_h = self.data.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        (min_h, max_h)
    }

    /// Линейно переводит значения в `[min_elevation, max_elevation]`
    ///
    /// Плоская карта целиком получает `min_elevation`.
    pub fn normalize(&mut self, min_elevation: f32, max_elevation: f32) {
        let (min_h, max_h) = self.range();
        if max_h > min_h {
            let multiplier = (max_elevation - min_elevation) / (max_h - min_h);
            for h in &mut self.data {
                *h = (*h - min_h) * multiplier + min_elevation;
            }
        } else {
            self.data.fill(min_elevation);
        }
    }

    /// Гасит крутые пики: `h *= 1 - factor · |grad|²`
    pub fn erode(&mut self, gradient: &GradientField, factor: f32) {
        for (h, slope) in self.data.iter_mut().zip(&gradient.data) {
            *h *= 1.0 - factor * slope.magnitude_squared();
        }
    }
}

/// Вектор уклона клетки
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Slope {
    pub x: f32,
    pub y: f32,
}

impl Slope {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn magnitude_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[must_use]
    pub fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }
}

/// Поле градиентов той же размерности, что и карта высот
#[derive(Debug, Clone)]
pub struct GradientField {
    pub width: u32,
    pub length: u32,
    pub data: Vec<Slope>,
}

impl GradientField {
    /// Нулевые уклоны везде
    pub fn flat(width: u32, length: u32) -> Self {
        Self {
            width,
            length,
            data: vec![Slope::default(); (width * length) as usize],
        }
    }

    /// Центральные разности по внутренним клеткам; граница получает нулевой уклон
    pub fn from_heights(heightmap: &Heightmap, cell_size: f32) -> Self {
        let width = heightmap.width as usize;
        let length = heightmap.length as usize;
        let mut field = Self::flat(heightmap.width, heightmap.length);
        let divisor = 2.0 * cell_size;

        for y in 1..length.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                let h = |xx: usize, yy: usize| heightmap.data[yy * width + xx];
                field.data[y * width + x] = Slope {
                    x: (h(x + 1, y) - h(x - 1, y)) / divisor,
                    y: (h(x, y + 1) - h(x, y - 1)) / divisor,
                };
            }
        }
        field
    }

    pub fn get(&self, x: u32, y: u32) -> Slope {
        self.data[(y * self.width + x) as usize]
    }
}

/// Генерирует карту высот и поле уклонов
///
/// 1. Четыре октавы когерентного шума: частота `base_scale / (i + 1)`, вклад умножается на частоту
/// 2. Нормализация в `[min_elevation, max_elevation]`
/// 3. Градиент, одна проходка эрозии, повторный градиент
///
/// Сид шума и сдвиг фазы берутся из общего генератора `rng`.
pub fn generate_heightmap<R: Rng>(
    config: &GenerationConfig,
    rng: &mut R,
) -> (Heightmap, GradientField) {
    let width = config.width;
    let length = config.length;
    let width_f = width as f32;
    let length_f = length as f32;

    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(rng.gen_range(i32::MIN..=i32::MAX)));
    noise.set_noise_type(Some(NoiseType::Perlin));
    // Координаты уже масштабированы октавой
    noise.set_frequency(Some(1.0));
    let phase = rng.gen_range(0.0..NOISE_PHASE_RANGE);

    let mut heightmap = Heightmap::new(width, length);

    for octave in 0..OCTAVES {
        let frequency = config.base_scale / (octave as f32 + 1.0);

        for y in 0..length {
            for x in 0..width {
                let nx = (x as f32 / width_f) * frequency + phase;
                let ny = (y as f32 / length_f) * frequency + phase;
                let value = (noise.get_noise_2d(nx, ny) + 1.0) * 0.5;

                let idx = (y * width + x) as usize;
                heightmap.data[idx] += value * frequency;
            }
        }
    }

    heightmap.normalize(config.min_elevation, config.max_elevation);

    let cell_size = config.effective_cell_size();
    let gradient = GradientField::from_heights(&heightmap, cell_size);
    heightmap.erode(&gradient, config.erosion_factor);
    let gradient = GradientField::from_heights(&heightmap, cell_size);

    (heightmap, gradient)
}
