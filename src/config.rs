//! Configuration for the yantra-link controller
//!
//! Loads configuration from a TOML file. Defaults match the reference
//! robot hardware (6.2cm wheels, 23.5cm wheelbase, metal sensor mounted
//! 7.3cm ahead of the wheel axle).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub robot: RobotGeometry,
    pub control: ControlConfig,
    pub display: DisplayConfig,
}

/// Network configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Well-known port shared by UDP discovery and the TCP link
    pub port: u16,
}

/// Physical robot geometry used by kinematics and instruction scaling
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RobotGeometry {
    /// Drive wheel diameter (cm)
    pub wheel_diameter: f32,
    /// Distance between the two drive wheels (cm)
    pub wheel_base: f32,
    /// Distance from the wheel axle to the sensor, along the forward axis (cm)
    pub sensor_offset: f32,
}

/// Input modality for the instruction generator (exactly one active)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Single joystick vector (angle + magnitude)
    Joystick,
    /// Two independent cursor axes (forward + steering)
    Cursors,
    /// Discrete arrow keys with press chaining
    Keyboard,
}

/// Control tick configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Active input modality
    pub mode: InputMode,
    /// Base speed multiplier (wheel revolutions per second at full input)
    pub speed: f32,
    /// Grid cell pitch in controlled mode (cm per cell)
    pub precision: f32,
    /// Grid cell pitch in scan mode (cm per cell)
    pub scan_precision: f32,
    /// Allow mixing forward/backward with turning in one instruction
    pub move_combination: bool,
    /// Scale instruction magnitude by the input norm
    pub speed_changes: bool,
    /// Cap on the repeated-keypress chain counter
    pub max_key_chain: u32,
}

/// Map display configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Output canvas resolution (square, pixels)
    pub resolution: usize,
    /// Sensor sensitivity compensation, in [0, 1); cell values are
    /// rescaled by 1/(1 - sensitivity) before display
    pub sensitivity: f32,
    /// Color for cell value 0.0 (RGB)
    pub color_low: [u8; 3],
    /// Color for cell value 1.0 (RGB)
    pub color_high: [u8; 3],
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { port: 51399 }
    }
}

impl Default for RobotGeometry {
    fn default() -> Self {
        Self {
            wheel_diameter: 6.2,
            wheel_base: 23.5,
            sensor_offset: 7.3,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::Keyboard,
            speed: 1.5,
            precision: 10.0,
            scan_precision: 10.0,
            move_combination: true,
            speed_changes: true,
            max_key_chain: 2,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            resolution: 1000,
            sensitivity: 0.0,
            color_low: [0, 0, 255],
            color_high: [255, 0, 0],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            robot: RobotGeometry::default(),
            control: ControlConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.network.port, 51399);
        assert_eq!(config.control.max_key_chain, 2);
        assert_eq!(config.display.resolution, 1000);
    }

    #[test]
    fn toml_deserialization() {
        let toml_content = r#"
[network]
port = 50000

[robot]
wheel_diameter = 7.0
wheel_base = 20.0
sensor_offset = 5.0

[control]
mode = "joystick"
speed = 2.0
precision = 5.0
scan_precision = 5.0
move_combination = false
speed_changes = false
max_key_chain = 4

[display]
resolution = 500
sensitivity = 0.2
color_low = [0, 255, 0]
color_high = [255, 255, 0]
"#;
        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.network.port, 50000);
        assert_eq!(config.control.mode, InputMode::Joystick);
        assert_eq!(config.display.color_low, [0, 255, 0]);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[control]\nspeed = 3.0\n").unwrap();
        assert_eq!(config.control.speed, 3.0);
        assert_eq!(config.network.port, 51399);
    }
}
