//! Controller session: ties the telemetry pipeline together.
//!
//! One session spans one Activate → Deactivate/disconnect interval. It
//! owns the map store, the dead-reckoning estimator, the viewport and the
//! canvas, consumes the typed events the dispatcher produces and exposes
//! the rendered frame to the display layer. All state here is
//! session-scoped: a disconnect throws the whole map and pose away.

use crate::config::AppConfig;
use crate::core::{Point2D, Pose2D};
use crate::dispatch::RobotEvent;
use crate::map::MapStore;
use crate::motion::{Instruction, PoseEstimator};
use crate::render::{Canvas, Rasterizer, Viewport};
use std::fmt;

/// Operating mode of a mapping session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Autonomous sweep of a rectangular area
    Scan,
    /// Manual teleoperation
    Controlled,
}

/// Free-text control strings sent to the robot under the `"Ins"` tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Enter teleoperation at the given cell pitch
    Controlled { precision: f32 },
    /// Start an autonomous scan: area size, cell pitch, drive speed
    Scan {
        width: f32,
        height: f32,
        cell_size: f32,
        speed: f32,
    },
    /// Change the cell pitch mid-session
    Precision(f32),
    /// Leave the current mode
    End,
    /// Power the robot down
    Shutdown,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Controlled { precision } => write!(f, "controlled {}", precision),
            ControlCommand::Scan {
                width,
                height,
                cell_size,
                speed,
            } => write!(f, "scan {} {} {} {}", width, height, cell_size, speed),
            ControlCommand::Precision(value) => write!(f, "precision {}", value),
            ControlCommand::End => write!(f, "end"),
            ControlCommand::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Live mapping session state.
pub struct ControllerSession {
    store: MapStore,
    estimator: PoseEstimator,
    viewport: Viewport,
    rasterizer: Rasterizer,
    canvas: Canvas,
    mode: SessionMode,
    cell_pitch: f32,
    camera_resolution: (u32, u32),
    camera_frame: Option<Vec<u8>>,
    dirty: bool,
}

impl ControllerSession {
    /// Build a session from configuration. The session starts inactive;
    /// call [`activate`](Self::activate) when a mapping mode begins.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: MapStore::new(config.display.sensitivity),
            estimator: PoseEstimator::new(config.robot),
            viewport: Viewport::new(config.display.resolution),
            rasterizer: Rasterizer::new(
                config.display.color_low.into(),
                config.display.color_high.into(),
            ),
            canvas: Canvas::new(config.display.resolution),
            mode: SessionMode::Controlled,
            cell_pitch: config.control.precision,
            camera_resolution: (500, 500),
            camera_frame: None,
            dirty: false,
        }
    }

    /// Start a mapping session: fresh grid, pose at origin, viewport
    /// reset, blank canvas.
    pub fn activate(&mut self, mode: SessionMode, cell_pitch: f32) {
        log::info!("Session activated ({:?}, pitch {})", mode, cell_pitch);
        self.mode = mode;
        self.cell_pitch = cell_pitch;
        self.reset();
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Cell pitch of the active session (world units per grid cell).
    pub fn cell_pitch(&self) -> f32 {
        self.cell_pitch
    }

    /// Drop all session-scoped state. Called on activate and on
    /// disconnect; the grid never shrinks any other way.
    pub fn reset(&mut self) {
        self.store.reset();
        self.estimator.restart();
        self.viewport.reset();
        self.canvas.clear();
        self.camera_frame = None;
        self.dirty = false;
    }

    /// Consume one typed robot event. Returns `false` when the event was
    /// a disconnect (the caller should tear the connection down and start
    /// rediscovery).
    pub fn handle_event(&mut self, event: RobotEvent) -> bool {
        match event {
            RobotEvent::MapUpdate(text) => {
                match self.store.merge(&text) {
                    Ok(record) => {
                        self.estimator
                            .set_sensor_pose(record.sensor, record.orientation);
                        self.dirty = true;
                    }
                    Err(e) => {
                        // Previous record stays current; the stale frame
                        // keeps rendering until a good update arrives.
                        log::warn!("Dropping malformed map update: {}", e);
                    }
                }
                true
            }
            RobotEvent::CameraFrame(bytes) => {
                self.camera_frame = Some(bytes);
                true
            }
            RobotEvent::CameraResolution { width, height } => {
                log::debug!("Camera resolution {}x{}", width, height);
                self.camera_resolution = (width, height);
                true
            }
            RobotEvent::Disconnected => {
                log::info!("Robot disconnected, resetting session state");
                self.reset();
                false
            }
        }
    }

    /// Integrate a locally produced instruction into the displayed pose
    /// (dead reckoning between authoritative map updates).
    pub fn predict(&mut self, instruction: &Instruction, dt: f32) {
        if *instruction != Instruction::Nothing {
            self.estimator.apply(instruction, dt);
        }
    }

    /// Estimated sensor pose (what map records report against).
    pub fn sensor_pose(&self) -> Pose2D {
        self.estimator.sensor_pose()
    }

    /// Canvas-pixel position of the robot indicator.
    pub fn robot_pixel(&self) -> Point2D {
        self.viewport.to_pixel(self.sensor_pose().position())
    }

    /// Change display sensitivity and re-derive the current map.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.store.set_sensitivity(sensitivity);
        self.dirty = true;
    }

    /// Last camera frame bytes, if any arrived this session.
    pub fn camera_frame(&self) -> Option<&[u8]> {
        self.camera_frame.as_deref()
    }

    /// Camera stream resolution.
    pub fn camera_resolution(&self) -> (u32, u32) {
        self.camera_resolution
    }

    /// Repaint the canvas if the map changed since the last call, then
    /// return it. Runs on the render tick, never on the receive thread.
    pub fn render(&mut self) -> &Canvas {
        if self.dirty {
            if let Some(record) = self.store.record() {
                self.viewport.update(
                    record.grid.rows(),
                    record.grid.cols(),
                    self.cell_pitch,
                    record.sensor,
                );
                self.rasterizer
                    .render(&record.grid, &self.viewport, self.cell_pitch, &mut self.canvas);
            }
            self.dirty = false;
        }
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rgba;
    use approx::assert_relative_eq;

    fn session() -> ControllerSession {
        let mut session = ControllerSession::new(&AppConfig::default());
        session.activate(SessionMode::Controlled, 10.0);
        session
    }

    #[test]
    fn control_command_wire_text() {
        assert_eq!(
            ControlCommand::Controlled { precision: 10.0 }.to_string(),
            "controlled 10"
        );
        assert_eq!(
            ControlCommand::Scan {
                width: 100.0,
                height: 80.0,
                cell_size: 5.0,
                speed: 1.5,
            }
            .to_string(),
            "scan 100 80 5 1.5"
        );
        assert_eq!(ControlCommand::Precision(7.5).to_string(), "precision 7.5");
        assert_eq!(ControlCommand::End.to_string(), "end");
        assert_eq!(ControlCommand::Shutdown.to_string(), "shutdown");
    }

    #[test]
    fn map_update_adopts_authoritative_pose() {
        let mut session = session();
        assert!(session.handle_event(RobotEvent::MapUpdate(
            "2;3;0;0;0;[[0.5]]".to_string()
        )));
        let pose = session.sensor_pose();
        assert_relative_eq!(pose.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(pose.y, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn malformed_update_keeps_previous_map() {
        let mut session = session();
        session.handle_event(RobotEvent::MapUpdate("2;3;0;0;0;[[0.5]]".to_string()));
        session.handle_event(RobotEvent::MapUpdate("garbage".to_string()));
        let pose = session.sensor_pose();
        assert_relative_eq!(pose.x, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn disconnect_resets_session_state() {
        let mut session = session();
        session.handle_event(RobotEvent::MapUpdate("2;3;0;0;0;[[0.9]]".to_string()));
        session.handle_event(RobotEvent::CameraFrame(vec![1, 2, 3]));
        assert!(!session.handle_event(RobotEvent::Disconnected));
        assert!(session.camera_frame().is_none());
        let pose = session.sensor_pose();
        assert_relative_eq!(pose.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pose.y, 0.0, epsilon = 1e-5);
        assert!(session.render().pixels().iter().all(|&p| p == Rgba::WHITE));
    }

    #[test]
    fn render_scenario_two_observed_cells() {
        let mut session = session();
        session.handle_event(RobotEvent::MapUpdate(
            "0;0;0;0;0;[[-1,0.5],[0.2,-1]]".to_string(),
        ));
        let rasterizer = Rasterizer::new(
            Rgba::rgb(0, 0, 255),
            Rgba::rgb(255, 0, 0),
        );
        let canvas = session.render();
        // Cell (0,1) center: rows map to x, cols to y -> pixel (500, 600).
        assert_eq!(canvas.get(500, 600), rasterizer.color_for(0.5));
        // Cell (1,0) center: pixel (600, 500).
        assert_eq!(canvas.get(600, 500), rasterizer.color_for(0.2));
        // Far corner stays background.
        assert_eq!(canvas.get(100, 900), Rgba::WHITE);
    }

    #[test]
    fn camera_metadata_retained_until_disconnect() {
        let mut session = session();
        session.handle_event(RobotEvent::CameraResolution {
            width: 640,
            height: 480,
        });
        session.handle_event(RobotEvent::CameraFrame(vec![0xff]));
        assert_eq!(session.camera_resolution(), (640, 480));
        assert_eq!(session.camera_frame(), Some(&[0xff][..]));
    }
}
