//! RGBA color with linear blending.

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque white (canvas background).
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Linear interpolation from `self` to `other`; `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Equal-weight blend of two colors.
    pub fn midpoint(self, other: Rgba) -> Rgba {
        self.lerp(other, 0.5)
    }
}

impl From<[u8; 3]> for Rgba {
    fn from(rgb: [u8; 3]) -> Self {
        Rgba::rgb(rgb[0], rgb[1], rgb[2])
    }
}
