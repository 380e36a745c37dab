//! Sparse grid → dense interpolated pixel buffer.
//!
//! Each observed cell paints the four quadrant rectangles between its own
//! center and the half-cell boundary toward each diagonal neighbor. The
//! four corner colors of a quadrant blend the cell with whichever of its
//! orthogonal and diagonal neighbors are observed, falling back through a
//! fixed precedence when they are not, so adjacent observed cells shade
//! into each other without visible cell boundaries. Unobserved cells are
//! never painted; they stay canvas background.

use crate::map::OccupancyGrid;
use crate::render::canvas::Canvas;
use crate::render::color::Rgba;
use crate::render::viewport::Viewport;

/// Neighbor direction pairs for the four quadrants around a cell:
/// (row-axis neighbor, column-axis neighbor).
const DIRECTIONS: [((i64, i64), (i64, i64)); 4] = [
    ((-1, 0), (0, 1)),
    ((1, 0), (0, 1)),
    ((-1, 0), (0, -1)),
    ((1, 0), (0, -1)),
];

/// Corner order (top-left, top-right, bottom-left, bottom-right) per
/// quadrant, indexing [own, row-neighbor, col-neighbor, diagonal];
/// accounts for each quadrant's flip relative to screen position.
const POSITIONS: [[usize; 4]; 4] = [
    [3, 2, 1, 0],
    [2, 3, 0, 1],
    [1, 0, 3, 2],
    [0, 1, 2, 3],
];

/// Renders an occupancy grid into a color canvas.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    color_low: Rgba,
    color_high: Rgba,
}

impl Rasterizer {
    /// Rasterizer with the two gradient endpoint colors (cell value 0.0
    /// maps to `color_low`, 1.0 to `color_high`).
    pub fn new(color_low: Rgba, color_high: Rgba) -> Self {
        Self {
            color_low,
            color_high,
        }
    }

    /// Color for a cell value.
    pub fn color_for(&self, value: f32) -> Rgba {
        self.color_low.lerp(self.color_high, value)
    }

    /// Repaint the whole canvas from the grid at `pitch` world units per
    /// cell under the given viewport transform.
    pub fn render(
        &self,
        grid: &OccupancyGrid,
        viewport: &Viewport,
        pitch: f32,
        canvas: &mut Canvas,
    ) {
        canvas.clear();
        let (origin_row, origin_col) = grid.origin();
        let origin = viewport.origin();
        let scale = viewport.scale();
        let cell_px = pitch * scale;

        for i in 0..grid.rows() as i64 {
            for j in 0..grid.cols() as i64 {
                if !grid.is_observed(i, j) {
                    continue;
                }
                let own = self.color_for(grid.get(i as usize, j as usize));

                for (k, &((dr, _), (_, dc))) in DIRECTIONS.iter().enumerate() {
                    let corners =
                        self.quadrant_corners(grid, i, j, dr, dc, own);

                    // Quadrant rectangle: cell center to the half-cell
                    // boundary toward the diagonal neighbor.
                    let diag_row = (i + dr) as f32;
                    let diag_col = (j + dc) as f32;
                    let mut x1 = (origin.x + (i as f32 - origin_row as f32) * cell_px) as i32;
                    let mut x2 = (origin.x
                        + ((diag_row + i as f32) / 2.0 - origin_row as f32) * cell_px)
                        as i32;
                    if x1 > x2 {
                        std::mem::swap(&mut x1, &mut x2);
                    }
                    let mut y1 = (origin.y + (j as f32 - origin_col as f32) * cell_px) as i32;
                    let mut y2 = (origin.y
                        + ((diag_col + j as f32) / 2.0 - origin_col as f32) * cell_px)
                        as i32;
                    if y1 > y2 {
                        std::mem::swap(&mut y1, &mut y2);
                    }

                    let pos = POSITIONS[k];
                    canvas.fill_bilinear(
                        x1,
                        y1,
                        x2 - x1,
                        y2 - y1,
                        corners[pos[0]],
                        corners[pos[1]],
                        corners[pos[2]],
                        corners[pos[3]],
                    );
                }
            }
        }
    }

    /// Corner colors [own, row-neighbor, col-neighbor, diagonal] for the
    /// quadrant reached by row step `dr` and column step `dc`.
    fn quadrant_corners(
        &self,
        grid: &OccupancyGrid,
        i: i64,
        j: i64,
        dr: i64,
        dc: i64,
        own: Rgba,
    ) -> [Rgba; 4] {
        let row_neighbor = grid
            .is_observed(i + dr, j)
            .then(|| self.color_for(grid.get((i + dr) as usize, j as usize)));
        let col_neighbor = grid
            .is_observed(i, j + dc)
            .then(|| self.color_for(grid.get(i as usize, (j + dc) as usize)));
        let diagonal = grid
            .is_observed(i + dr, j + dc)
            .then(|| self.color_for(grid.get((i + dr) as usize, (j + dc) as usize)));

        let row_corner = row_neighbor.map_or(own, |c| own.midpoint(c));
        let col_corner = col_neighbor.map_or(own, |c| own.midpoint(c));

        let diag_corner = match (row_neighbor, col_neighbor) {
            (Some(rc), Some(cc)) => match diagonal {
                // Both orthogonal neighbors present: blend toward the
                // diagonal through the column neighbor's midpoint.
                Some(dc_color) => row_corner.midpoint(cc.midpoint(dc_color)),
                None => rc.midpoint(cc),
            },
            (Some(_), None) => match diagonal {
                Some(dc_color) => own.midpoint(dc_color),
                None => row_corner,
            },
            (None, Some(_)) => match diagonal {
                Some(dc_color) => own.midpoint(dc_color),
                None => col_corner,
            },
            (None, None) => own,
        };

        [own, row_corner, col_corner, diag_corner]
    }
}
