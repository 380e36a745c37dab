//! Instruction generation from multi-modal input.
//!
//! Runs once per control tick on the UI thread. Exactly one input modality
//! is active at a time (per configuration): a joystick vector, a pair of
//! cursor axes, or discrete arrow keys. Keyboard input is debounced through
//! per-direction press chains so rapid repeated taps scale into a
//! continuous-like magnitude.
//!
//! Transmission is throttled: an instruction is resent only when its
//! variant changes, it drifts past the per-variant tolerance, or the 0.8s
//! heartbeat elapses.

use crate::config::{ControlConfig, RobotGeometry};
use crate::motion::instruction::Instruction;
use std::f32::consts::PI;

/// Heartbeat interval: resend the current instruction at least this often.
pub const HEARTBEAT: f32 = 0.8;

/// Debounce window for keyboard press chains.
pub const CHAIN_TIME: f32 = 0.12;

/// Joystick angle quantization step (15 degrees).
const ANGLE_STEP: f32 = PI / 12.0;

/// Inputs below this are treated as a zeroed axis.
const AXIS_EPSILON: f32 = 1e-4;

/// Discrete drive keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveKey {
    Forward,
    Backward,
    Right,
    Left,
}

/// One control tick's worth of input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputSample {
    /// Joystick vector: angle in radians from the lateral axis (π/2 is
    /// straight ahead), magnitude in [0, 1]. The angle is quantized to
    /// 15° steps before mapping.
    Joystick { angle: f32, magnitude: f32 },
    /// Two independent normalized axes in [-1, 1].
    Cursors { forward: f32, steer: f32 },
    /// Keyboard state; magnitudes come from the press chains fed through
    /// [`InstructionGenerator::key_event`].
    Keys,
}

/// Debounced repeated-press counter for one key.
#[derive(Debug, Clone, Copy, Default)]
struct ChainState {
    chain: u32,
    last_chain: u32,
    timer: f32,
}

impl ChainState {
    fn tick(&mut self, dt: f32) {
        if self.timer > 0.0 {
            self.timer = (self.timer - dt).max(0.0);
        }
    }

    fn press(&mut self, max_chain: u32) {
        if self.timer > 0.0 {
            self.chain = (self.last_chain + 1).min(max_chain);
        } else {
            self.chain = 1;
        }
    }

    fn release(&mut self) {
        self.last_chain = self.chain;
        self.chain = 0;
        self.timer = CHAIN_TIME;
    }
}

/// Maps input samples to drive instructions with change-detection
/// throttled transmission.
#[derive(Debug, Clone)]
pub struct InstructionGenerator {
    config: ControlConfig,
    geometry: RobotGeometry,
    forward: ChainState,
    backward: ChainState,
    right: ChainState,
    left: ChainState,
    current: Instruction,
    last_sent: Instruction,
    send_timer: f32,
}

impl InstructionGenerator {
    /// New generator with no send history.
    pub fn new(config: ControlConfig, geometry: RobotGeometry) -> Self {
        Self {
            config,
            geometry,
            forward: ChainState::default(),
            backward: ChainState::default(),
            right: ChainState::default(),
            left: ChainState::default(),
            current: Instruction::Nothing,
            last_sent: Instruction::Nothing,
            send_timer: 0.0,
        }
    }

    /// Forget send history and chain state (session reset).
    pub fn reset(&mut self) {
        self.forward = ChainState::default();
        self.backward = ChainState::default();
        self.right = ChainState::default();
        self.left = ChainState::default();
        self.current = Instruction::Nothing;
        self.last_sent = Instruction::Nothing;
        self.send_timer = 0.0;
    }

    /// Feed a key press or release into the chain tracker.
    pub fn key_event(&mut self, key: DriveKey, pressed: bool) {
        let chain = match key {
            DriveKey::Forward => &mut self.forward,
            DriveKey::Backward => &mut self.backward,
            DriveKey::Right => &mut self.right,
            DriveKey::Left => &mut self.left,
        };
        if pressed {
            chain.press(self.config.max_key_chain);
        } else {
            chain.release();
        }
    }

    /// Instruction produced by the most recent tick.
    pub fn current(&self) -> Instruction {
        self.current
    }

    /// Advance one control tick. Returns the instruction to transmit, or
    /// `None` when throttling suppresses the send.
    pub fn tick(&mut self, input: &InputSample, dt: f32) -> Option<Instruction> {
        self.forward.tick(dt);
        self.backward.tick(dt);
        self.right.tick(dt);
        self.left.tick(dt);
        self.send_timer += dt;

        let (mut x, mut y, norm) = self.axes(input);

        if !self.config.move_combination {
            // Forced single-axis: keep the dominant one.
            if x.abs() >= y.abs() {
                y = 0.0;
            } else {
                x = 0.0;
            }
        }
        if x != 0.0 || y != 0.0 {
            let sum = x.abs() + y.abs();
            x /= sum;
            y /= sum;
        }
        if self.config.speed_changes {
            x *= norm;
            y *= norm;
        }

        self.current = self.map_axes(x, y);

        if self.send_timer > HEARTBEAT || !self.current.almost_eq(&self.last_sent) {
            self.send_timer = 0.0;
            self.last_sent = self.current;
            Some(self.current)
        } else {
            None
        }
    }

    /// Raw (forward, turn, norm) axes for the active modality.
    fn axes(&self, input: &InputSample) -> (f32, f32, f32) {
        match *input {
            InputSample::Joystick { angle, magnitude } => {
                let quantized = (angle / ANGLE_STEP).round() * ANGLE_STEP;
                (quantized.sin(), quantized.cos(), magnitude)
            }
            InputSample::Cursors { forward, steer } => {
                (forward, steer, forward.abs().max(steer.abs()))
            }
            InputSample::Keys => {
                let x = self.forward.chain as f32 - self.backward.chain as f32;
                let y = self.right.chain as f32 - self.left.chain as f32;
                let norm = x.abs().max(y.abs()) / self.config.max_key_chain as f32;
                (x, y, norm)
            }
        }
    }

    /// Map a normalized axis pair to an instruction. Pure-x drives
    /// straight, pure-y turns in place, anything else mixes wheels.
    fn map_axes(&self, x: f32, y: f32) -> Instruction {
        if x == 0.0 && y == 0.0 {
            return Instruction::Nothing;
        }
        // Full input spins the wheels at `speed` revolutions per second.
        let linear = self.config.speed * PI * self.geometry.wheel_diameter;
        if y.abs() < AXIS_EPSILON {
            if x > 0.0 {
                Instruction::Forward(x * linear)
            } else {
                Instruction::Backward(-x * linear)
            }
        } else if x.abs() < AXIS_EPSILON {
            let angular =
                360.0 * self.config.speed * self.geometry.wheel_diameter / self.geometry.wheel_base;
            if y > 0.0 {
                Instruction::Right(y * angular)
            } else {
                Instruction::Left(-y * angular)
            }
        } else {
            Instruction::Combine((x + y) * linear, (x - y) * linear)
        }
    }
}
