//! Fixed-size square pixel canvas.

use crate::render::color::Rgba;

/// Square RGBA pixel buffer, row-major, origin at the bottom-left to
/// match map coordinates (the display layer owns any vertical flip).
#[derive(Debug, Clone)]
pub struct Canvas {
    resolution: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// White canvas of `resolution × resolution` pixels.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            pixels: vec![Rgba::WHITE; resolution * resolution],
        }
    }

    /// Side length in pixels.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Flat pixel slice, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixel at (x, y); out-of-bounds reads as background.
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        if x < self.resolution && y < self.resolution {
            self.pixels[y * self.resolution + x]
        } else {
            Rgba::WHITE
        }
    }

    /// Reset every pixel to the white background.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::WHITE);
    }

    /// Fill a rectangle by bilinear interpolation between four corner
    /// colors. The rectangle is clipped to the canvas; corner colors map
    /// to the rectangle's own corners regardless of clipping.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_bilinear(
        &mut self,
        x0: i32,
        y0: i32,
        width: i32,
        height: i32,
        top_left: Rgba,
        top_right: Rgba,
        bottom_left: Rgba,
        bottom_right: Rgba,
    ) {
        if width <= 0 || height <= 0 {
            return;
        }
        for row in 0..height {
            let y = y0 + row;
            if y < 0 || y as usize >= self.resolution {
                continue;
            }
            let ty = row as f32 / height as f32;
            let start = bottom_left.lerp(top_left, ty);
            let end = bottom_right.lerp(top_right, ty);
            for col in 0..width {
                let x = x0 + col;
                if x < 0 || x as usize >= self.resolution {
                    continue;
                }
                let tx = col as f32 / width as f32;
                self.pixels[y as usize * self.resolution + x as usize] = start.lerp(end, tx);
            }
        }
    }
}
