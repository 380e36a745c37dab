//! Growable occupancy grid storage.
//!
//! Row-major flat storage of scalar cell values in [0, 1], with the
//! sentinel [`UNOBSERVED`] marking cells never measured. The grid carries
//! an origin index naming the cell under local coordinate (0, 0); the
//! index moves whenever a row or column is prepended. Within a mapping
//! session the grid only grows, one row or column per unit of overflow.

use crate::error::{Error, Result};

/// Sentinel value for cells that were never observed.
pub const UNOBSERVED: f32 = -1.0;

/// Rectangular 2D scalar grid with an origin offset.
///
/// Rows run along the local X axis, columns along local Y, matching the
/// map record layout sent by the robot.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    cells: Vec<f32>,
    rows: usize,
    cols: usize,
    origin_row: i32,
    origin_col: i32,
}

impl OccupancyGrid {
    /// Fresh 1×1 unobserved grid with origin at (0, 0).
    pub fn new() -> Self {
        Self {
            cells: vec![UNOBSERVED],
            rows: 1,
            cols: 1,
            origin_row: 0,
            origin_col: 0,
        }
    }

    /// Build from row vectors. Fails unless all rows have equal positive
    /// length.
    pub fn from_rows(rows: Vec<Vec<f32>>, origin_row: i32, origin_col: i32) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(Error::Parse("empty grid".to_string()));
        }
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::Parse("ragged grid rows".to_string()));
        }
        let mut cells = Vec::with_capacity(height * width);
        for row in &rows {
            cells.extend_from_slice(row);
        }
        Ok(Self {
            cells,
            rows: height,
            cols: width,
            origin_row,
            origin_col,
        })
    }

    /// Number of rows (extent along local X).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (extent along local Y).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Origin index (row, col) of local coordinate (0, 0).
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_row, self.origin_col)
    }

    /// Cell value; out-of-bounds reads as unobserved.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            UNOBSERVED
        }
    }

    /// Set a cell value. Caller must have bounded the index first.
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        debug_assert!(row < self.rows && col < self.cols);
        self.cells[row * self.cols + col] = value;
    }

    /// Whether the cell exists and holds an observation.
    pub fn is_observed(&self, row: i64, col: i64) -> bool {
        row >= 0
            && col >= 0
            && (row as usize) < self.rows
            && (col as usize) < self.cols
            && self.cells[row as usize * self.cols + col as usize] != UNOBSERVED
    }

    /// Grow until the signed cell index fits, one row/column per unit of
    /// overflow, and return the bounded in-grid index.
    ///
    /// Prepending shifts the origin index on that axis; appending leaves
    /// it unchanged. New cells start unobserved.
    pub fn ensure_contains(&mut self, mut row: i64, mut col: i64) -> (usize, usize) {
        while row < 0 {
            self.prepend_row();
            row += 1;
        }
        while row >= self.rows as i64 {
            self.append_row();
        }
        while col < 0 {
            self.prepend_col();
            col += 1;
        }
        while col >= self.cols as i64 {
            self.append_col();
        }
        (row as usize, col as usize)
    }

    /// Copy the grid out as row vectors (for serialization).
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.cells.chunks(self.cols).map(<[f32]>::to_vec).collect()
    }

    fn append_row(&mut self) {
        self.cells.extend(std::iter::repeat(UNOBSERVED).take(self.cols));
        self.rows += 1;
    }

    fn prepend_row(&mut self) {
        self.cells.splice(0..0, std::iter::repeat(UNOBSERVED).take(self.cols));
        self.rows += 1;
        self.origin_row += 1;
    }

    fn append_col(&mut self) {
        let mut cells = Vec::with_capacity(self.rows * (self.cols + 1));
        for row in self.cells.chunks(self.cols) {
            cells.extend_from_slice(row);
            cells.push(UNOBSERVED);
        }
        self.cells = cells;
        self.cols += 1;
    }

    fn prepend_col(&mut self) {
        let mut cells = Vec::with_capacity(self.rows * (self.cols + 1));
        for row in self.cells.chunks(self.cols) {
            cells.push(UNOBSERVED);
            cells.extend_from_slice(row);
        }
        self.cells = cells;
        self.cols += 1;
        self.origin_col += 1;
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}
