//! Destructible bitmap terrain
//!
//! Cells only ever go solid -> empty once the match runs. All collision and
//! ground-height queries read from here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::DeterministicRng;
use crate::settings::{ConfigError, TerrainSettings};

/// Largest accepted side length
pub const MAX_FIELD_SIDE: u32 = 8192;

/// A cell coordinate removed by excavation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

/// Solid/empty grid, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainField {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl TerrainField {
    /// Empty field
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || width > MAX_FIELD_SIDE || height > MAX_FIELD_SIDE {
            return Err(ConfigError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        })
    }

    /// Procedural hills: per column, ground = base * height minus the sum of
    /// `hill.height * cos(pi * dist / hill.width)` for every hill closer than its width,
    /// filled down to the bottom.
    pub fn generate_hilly(
        width: u32,
        height: u32,
        params: &TerrainSettings,
        rng: &mut DeterministicRng,
    ) -> Result<Self, ConfigError> {
        let mut field = Self::new(width, height)?;

        let count = rng.next_int(i64::from(params.min_hills), i64::from(params.max_hills));
        let hills: Vec<(f64, f64, f64)> = (0..count)
            .map(|_| {
                let x = rng.next_float(0.0, f64::from(width));
                let h = rng.next_float(params.min_hill_height, params.max_hill_height);
                let w = rng.next_float(params.min_hill_width, params.max_hill_width);
                (x, h, w)
            })
            .collect();

        for x in 0..width {
            let mut ground = f64::from(height) * params.base_level;
            for &(hx, hh, hw) in &hills {
                let dist = (f64::from(x) - hx).abs();
                if dist < hw {
                    ground -= hh * (std::f64::consts::PI * dist / hw).cos();
                }
            }
            let top = ground.floor().max(0.0) as u32;
            for y in top..height {
                field.set_pixel(x as i32, y as i32, true);
            }
        }

        log::debug!("Generated terrain {}x{} with {} hills", width, height, hills.len());
        Ok(field)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Bounds-checked; everything outside the field is empty
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    /// Solidity of the cell containing a point
    pub fn is_solid_at(&self, p: Vec2) -> bool {
        self.is_solid(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Bounds-checked; no-op outside the field
    pub fn set_pixel(&mut self, x: i32, y: i32, solid: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = solid;
        }
    }

    /// Clear every solid cell within `radius` of `center`; returns the cleared cells
    pub fn excavate(&mut self, center: Vec2, radius: f32) -> Vec<Cell> {
        let min_x = (center.x - radius).floor().max(0.0) as i32;
        let max_x = ((center.x + radius).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (center.y - radius).floor().max(0.0) as i32;
        let max_y = ((center.y + radius).ceil() as i32).min(self.height as i32 - 1);
        let radius_sq = radius * radius;

        let mut cleared = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - center.x;
                let dy = y as f32 - center.y;
                if dx * dx + dy * dy <= radius_sq && self.is_solid(x, y) {
                    self.set_pixel(x, y, false);
                    cleared.push(Cell {
                        x: x as u32,
                        y: y as u32,
                    });
                }
            }
        }
        cleared
    }

    /// Y of the topmost solid cell in column `x`, or the field height if none
    pub fn ground_y(&self, x: i32) -> u32 {
        if x < 0 || x >= self.width as i32 {
            return self.height;
        }
        (0..self.height)
            .find(|&y| self.is_solid(x, y as i32))
            .unwrap_or(self.height)
    }

    /// First solid cell at or below `y` in column `x`, or the field height if none
    pub fn ground_below(&self, x: i32, y: i32) -> u32 {
        let start = y.max(0);
        (start..self.height as i32)
            .find(|&row| self.is_solid(x, row))
            .map_or(self.height, |row| row as u32)
    }

    /// Number of solid cells (diagnostics and tests)
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
