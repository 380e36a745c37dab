//! Viewport transform: world units → canvas pixels.
//!
//! The canvas is a fixed square; as the mapped area grows the scale
//! shrinks geometrically so the grid plus a lookahead border always fits.
//! Within a session the scale never increases again, which keeps the zoom
//! from oscillating as the footprint fluctuates. The origin scrolls ahead
//! of the robot in discrete half-border steps so the indicator stays
//! inside a safe interior region.

use crate::core::Point2D;

/// World units spanned by one scale bucket; the initial view shows
/// `2 * UNITS_PER_BUCKET` world units across the canvas.
const UNITS_PER_BUCKET: f32 = 50.0;

/// World → pixel transform for the map canvas.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    resolution: usize,
    origin: Point2D,
    scale: f32,
}

impl Viewport {
    /// Session-start viewport: origin at canvas center, 100 world units
    /// across.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            origin: Point2D::new(resolution as f32 / 2.0, resolution as f32 / 2.0),
            scale: resolution as f32 / (2.0 * UNITS_PER_BUCKET),
        }
    }

    /// Reset to the session-start transform.
    pub fn reset(&mut self) {
        *self = Viewport::new(self.resolution);
    }

    /// Pixels per world unit.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Canvas-pixel position of the world origin.
    pub fn origin(&self) -> Point2D {
        self.origin
    }

    /// Lookahead margin as a fraction of the canvas, for the given cell
    /// pitch at the current scale.
    pub fn border_proportion(&self, pitch: f32) -> f32 {
        pitch / (self.resolution as f32 / self.scale)
    }

    /// Map a world position to canvas pixels.
    pub fn to_pixel(&self, world: Point2D) -> Point2D {
        world * self.scale + self.origin
    }

    /// Refit the transform for a grid of `rows × cols` cells at `pitch`
    /// world units per cell, with the robot sensor at `robot`.
    ///
    /// Shrinks the scale when the footprint (plus border margin) would
    /// exceed the canvas, never grows it, then scrolls the origin in
    /// discrete steps while the robot sits within a border of any edge.
    pub fn update(&mut self, rows: usize, cols: usize, pitch: f32, robot: Point2D) {
        let res = self.resolution as f32;
        let border = self.border_proportion(pitch);

        // Footprint in scale buckets, including the lookahead margin.
        let extent = |cells: usize| -> i32 {
            let size = (cells as f32 * pitch * (1.0 + 2.0 * border)) / UNITS_PER_BUCKET;
            (size as i32).max(1)
        };
        let buckets = extent(rows).max(extent(cols));
        let fitted = res / (UNITS_PER_BUCKET * (buckets + 1) as f32);
        if fitted < self.scale {
            self.scale = fitted;
        }

        // Scroll-ahead: shift the origin while the robot is rendered
        // within a border of any edge.
        let rel = robot * self.scale + self.origin;
        let step = res * (border / 2.0);
        if step <= 0.0 {
            return;
        }
        if rel.x < res * border {
            self.origin.x += step * (((res * border - rel.x) / step) as i32 + 1) as f32;
        } else if rel.x > res * (1.0 - border) {
            self.origin.x -= step * (((rel.x - res * (1.0 - border)) / step) as i32 + 1) as f32;
        }
        if rel.y < res * border {
            self.origin.y += step * (((res * border - rel.y) / step) as i32 + 1) as f32;
        } else if rel.y > res * (1.0 - border) {
            self.origin.y -= step * (((rel.y - res * (1.0 - border)) / step) as i32 + 1) as f32;
        }
    }
}
