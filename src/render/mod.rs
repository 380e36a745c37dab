//! Map rendering: viewport transform, color blending and rasterization.

pub mod canvas;
pub mod color;
pub mod raster;
pub mod viewport;

pub use canvas::Canvas;
pub use color::Rgba;
pub use raster::Rasterizer;
pub use viewport::Viewport;
