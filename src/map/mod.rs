//! Occupancy grid store: growable grid plus map record handling.

pub mod grid;
pub mod record;

pub use grid::{OccupancyGrid, UNOBSERVED};
pub use record::{MapRecord, MapStore};
