//! Map record parsing and retention.
//!
//! The robot sends the full map as one semicolon-delimited text record:
//!
//! ```text
//! sensorX;sensorY;orientationRad;originRow;originCol;JSON-2D-float-array
//! ```
//!
//! [`MapStore`] keeps the last successfully parsed record text so the map
//! can be re-rendered with new display parameters without waiting for the
//! next update, and so a malformed record leaves the previous state intact.

use crate::core::Point2D;
use crate::error::{Error, Result};
use crate::map::grid::{OccupancyGrid, UNOBSERVED};

/// One parsed map update.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    /// Sensor position reported by the robot
    pub sensor: Point2D,
    /// Robot orientation in radians
    pub orientation: f32,
    /// Grid with the record's origin index applied
    pub grid: OccupancyGrid,
}

impl MapRecord {
    /// Parse a record, rescaling observed cells by `1/(1 - sensitivity)`.
    ///
    /// Numeric fields tolerate `,` as the decimal separator; the robot
    /// runtime formats floats with the host locale.
    pub fn parse(text: &str, sensitivity: f32) -> Result<Self> {
        let mut fields = text.splitn(6, ';');
        let sensor_x = parse_float(fields.next(), "sensor x")?;
        let sensor_y = parse_float(fields.next(), "sensor y")?;
        let orientation = parse_float(fields.next(), "orientation")?;
        let origin_row = parse_int(fields.next(), "origin row")?;
        let origin_col = parse_int(fields.next(), "origin col")?;
        let array = fields
            .next()
            .ok_or_else(|| Error::Parse("missing grid array".to_string()))?;

        let mut rows: Vec<Vec<f32>> = serde_json::from_str(array)?;
        let gain = 1.0 / (1.0 - sensitivity);
        for row in &mut rows {
            for value in row.iter_mut() {
                if *value != UNOBSERVED {
                    *value *= gain;
                }
            }
        }

        Ok(Self {
            sensor: Point2D::new(sensor_x, sensor_y),
            orientation,
            grid: OccupancyGrid::from_rows(rows, origin_row, origin_col)?,
        })
    }
}

fn parse_float(field: Option<&str>, name: &str) -> Result<f32> {
    let field = field.ok_or_else(|| Error::Parse(format!("missing {}", name)))?;
    field
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| Error::Parse(format!("invalid {}: {:?}", name, field)))
}

fn parse_int(field: Option<&str>, name: &str) -> Result<i32> {
    let field = field.ok_or_else(|| Error::Parse(format!("missing {}", name)))?;
    field
        .trim()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid {}: {:?}", name, field)))
}

/// Holds the current map and the last good record text.
#[derive(Debug, Default)]
pub struct MapStore {
    record: Option<MapRecord>,
    last_text: Option<String>,
    sensitivity: f32,
}

impl MapStore {
    /// Empty store with the given display sensitivity.
    pub fn new(sensitivity: f32) -> Self {
        Self {
            record: None,
            last_text: None,
            sensitivity,
        }
    }

    /// Parse and adopt a new record. On failure the previous record stays
    /// current and the error is returned for the caller to log.
    pub fn merge(&mut self, text: &str) -> Result<&MapRecord> {
        let record = MapRecord::parse(text, self.sensitivity)?;
        self.last_text = Some(text.to_string());
        Ok(self.record.insert(record))
    }

    /// Re-parse the last good record with the current sensitivity.
    /// No-op when nothing was ever merged.
    pub fn refresh(&mut self) -> Option<&MapRecord> {
        let text = self.last_text.clone()?;
        match MapRecord::parse(&text, self.sensitivity) {
            Ok(record) => {
                self.record = Some(record);
                self.record.as_ref()
            }
            Err(e) => {
                // Cached text parsed before; only a sensitivity of 1.0
                // (division by zero upstream) could get here.
                log::warn!("Failed to replay cached map record: {}", e);
                self.record.as_ref()
            }
        }
    }

    /// Change display sensitivity and re-derive the current record.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
        self.refresh();
    }

    /// Current record, if any update has been merged this session.
    pub fn record(&self) -> Option<&MapRecord> {
        self.record.as_ref()
    }

    /// Drop all session state.
    pub fn reset(&mut self) {
        self.record = None;
        self.last_text = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_reference_record() {
        let record = MapRecord::parse("0;0;0;0;0;[[-1,0.5],[0.2,-1]]", 0.0).unwrap();
        assert_eq!((record.grid.rows(), record.grid.cols()), (2, 2));
        assert_eq!(record.grid.origin(), (0, 0));
        assert_relative_eq!(record.grid.get(0, 1), 0.5);
        assert_relative_eq!(record.grid.get(1, 0), 0.2);
        assert_eq!(record.grid.get(0, 0), UNOBSERVED);
        assert_eq!(record.grid.get(1, 1), UNOBSERVED);
    }

    #[test]
    fn sensitivity_rescales_observed_cells_only() {
        let record = MapRecord::parse("0;0;0;0;0;[[-1,0.5]]", 0.5).unwrap();
        assert_relative_eq!(record.grid.get(0, 1), 1.0);
        assert_eq!(record.grid.get(0, 0), UNOBSERVED);
    }

    #[test]
    fn comma_decimal_separator_accepted() {
        let record = MapRecord::parse("1,5;-2,25;0,5;0;0;[[0.1]]", 0.0).unwrap();
        assert_relative_eq!(record.sensor.x, 1.5);
        assert_relative_eq!(record.sensor.y, -2.25);
        assert_relative_eq!(record.orientation, 0.5);
    }

    #[test]
    fn malformed_record_keeps_previous() {
        let mut store = MapStore::new(0.0);
        store.merge("1;2;0;0;0;[[0.4]]").unwrap();
        assert!(store.merge("bogus;;;").is_err());
        let record = store.record().unwrap();
        assert_relative_eq!(record.sensor.x, 1.0);
        assert_relative_eq!(record.grid.get(0, 0), 0.4);
    }

    #[test]
    fn refresh_replays_with_new_sensitivity() {
        let mut store = MapStore::new(0.0);
        store.merge("0;0;0;0;0;[[0.4]]").unwrap();
        store.set_sensitivity(0.5);
        assert_relative_eq!(store.record().unwrap().grid.get(0, 0), 0.8);
    }

    #[test]
    fn ragged_array_is_parse_error() {
        assert!(MapRecord::parse("0;0;0;0;0;[[0.1,0.2],[0.3]]", 0.0).is_err());
    }
}
