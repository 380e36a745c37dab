//! Offline robot simulator for demo mode.
//!
//! Produces the same telemetry a real robot would: a scripted drive plan
//! feeds the dead-reckoning estimator, and a map synthesizer invents
//! plausible occupancy readings along the path and serializes them in the
//! wire record format. Lets the whole pipeline run without hardware.

use crate::error::Result;
use crate::map::{OccupancyGrid, UNOBSERVED};
use crate::motion::Instruction;
use rand::Rng;
use std::collections::VecDeque;

/// Occupancy assigned to a cell with no observed neighbors.
const BASELINE_OCCUPANCY: f32 = 0.5;
/// Random spread around the neighborhood mean.
const NOISE_AMPLITUDE: f32 = 0.15;

/// A queued sequence of timed drive segments.
///
/// Each segment is an instruction held for a duration; `progress`
/// consumes time and reports the instruction currently in effect.
pub struct ScriptedDrive {
    segments: VecDeque<(Instruction, f32)>,
}

impl ScriptedDrive {
    pub fn new() -> Self {
        Self {
            segments: VecDeque::new(),
        }
    }

    /// A square-ish loop that exercises straight runs and turns.
    pub fn demo_loop(speed: f32) -> Self {
        let mut drive = Self::new();
        for _ in 0..4 {
            drive.forward(speed * 20.0, 3.0);
            drive.pause(0.5);
            drive.turn(90.0, 1.0);
        }
        drive.pause(1.0);
        drive
    }

    pub fn forward(&mut self, speed: f32, duration: f32) -> &mut Self {
        self.segments
            .push_back((Instruction::Forward(speed), duration));
        self
    }

    pub fn backward(&mut self, speed: f32, duration: f32) -> &mut Self {
        self.segments
            .push_back((Instruction::Backward(speed), duration));
        self
    }

    /// Turn clockwise through `degrees` over `duration` seconds.
    pub fn turn(&mut self, degrees: f32, duration: f32) -> &mut Self {
        self.segments
            .push_back((Instruction::Right(degrees / duration), duration));
        self
    }

    pub fn pause(&mut self, duration: f32) -> &mut Self {
        self.segments.push_back((Instruction::Nothing, duration));
        self
    }

    /// Advance the script by `dt` seconds and return the instruction in
    /// effect, or `None` once the script is exhausted.
    pub fn progress(&mut self, dt: f32) -> Option<Instruction> {
        let (instruction, remaining) = self.segments.front_mut()?;
        let current = *instruction;
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.segments.pop_front();
        }
        Some(current)
    }

    pub fn is_finished(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for ScriptedDrive {
    fn default() -> Self {
        Self::new()
    }
}

/// Invents occupancy readings along the simulated path.
///
/// Every observation lands in the grid cell under the sensor; new cells
/// take the mean of their observed 4-neighborhood plus noise, so the
/// synthetic map has smooth local structure instead of white noise.
pub struct MapSynthesizer {
    grid: OccupancyGrid,
    cell_pitch: f32,
}

impl MapSynthesizer {
    pub fn new(cell_pitch: f32) -> Self {
        Self {
            grid: OccupancyGrid::new(),
            cell_pitch,
        }
    }

    /// Record an observation at the sensor's world position, growing the
    /// grid when the position falls outside it.
    pub fn observe<R: Rng>(&mut self, sensor_x: f32, sensor_y: f32, rng: &mut R) {
        let (origin_row, origin_col) = self.grid.origin();
        let row = (sensor_x / self.cell_pitch + 0.5).floor() as i64 + origin_row as i64;
        let col = (sensor_y / self.cell_pitch + 0.5).floor() as i64 + origin_col as i64;
        let (r, c) = self.grid.ensure_contains(row, col);
        if self.grid.get(r, c) != UNOBSERVED {
            return;
        }
        let mean = self.neighborhood_mean(r as i64, c as i64);
        let value = (mean + rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE)).clamp(0.0, 1.0);
        self.grid.set(r, c, value);
    }

    fn neighborhood_mean(&self, row: i64, col: i64) -> f32 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for (dr, dc) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
            if self.grid.is_observed(row + dr, col + dc) {
                sum += self.grid.get((row + dr) as usize, (col + dc) as usize);
                count += 1;
            }
        }
        if count == 0 {
            BASELINE_OCCUPANCY
        } else {
            sum / count as f32
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Serialize the current state in the map record wire format.
    pub fn record_text(&self, sensor_x: f32, sensor_y: f32, orientation: f32) -> Result<String> {
        let (origin_row, origin_col) = self.grid.origin();
        let array = serde_json::to_string(&self.grid.to_rows())?;
        Ok(format!(
            "{};{};{};{};{};{}",
            sensor_x, sensor_y, orientation, origin_row, origin_col, array
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn script_runs_segments_in_order() {
        let mut drive = ScriptedDrive::new();
        drive.forward(10.0, 1.0).pause(0.5);
        assert_eq!(drive.progress(0.6), Some(Instruction::Forward(10.0)));
        assert_eq!(drive.progress(0.6), Some(Instruction::Forward(10.0)));
        assert_eq!(drive.progress(0.6), Some(Instruction::Nothing));
        assert_eq!(drive.progress(0.6), None);
        assert!(drive.is_finished());
    }

    #[test]
    fn first_observation_lands_near_baseline() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut synth = MapSynthesizer::new(10.0);
        synth.observe(0.0, 0.0, &mut rng);
        let value = synth.grid().get(0, 0);
        assert!(value >= BASELINE_OCCUPANCY - NOISE_AMPLITUDE);
        assert!(value <= BASELINE_OCCUPANCY + NOISE_AMPLITUDE);
    }

    #[test]
    fn observations_grow_the_grid_behind_origin() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut synth = MapSynthesizer::new(10.0);
        synth.observe(0.0, 0.0, &mut rng);
        synth.observe(-20.0, 0.0, &mut rng);
        assert_eq!(synth.grid().rows(), 3);
        let (origin_row, origin_col) = synth.grid().origin();
        assert_eq!((origin_row, origin_col), (2, 0));
    }

    #[test]
    fn record_text_round_trips_through_parser() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut synth = MapSynthesizer::new(10.0);
        synth.observe(0.0, 0.0, &mut rng);
        synth.observe(10.0, 0.0, &mut rng);
        let text = synth.record_text(12.0, 3.0, 0.5).unwrap();
        let record = MapRecord::parse(&text, 0.0).unwrap();
        assert_eq!(record.grid.rows(), synth.grid().rows());
        assert_eq!(record.grid.origin(), synth.grid().origin());
    }
}
