//! Drive instructions, input mapping and dead-reckoning kinematics.

pub mod estimator;
pub mod generator;
pub mod instruction;

pub use estimator::PoseEstimator;
pub use generator::{DriveKey, InputSample, InstructionGenerator, CHAIN_TIME, HEARTBEAT};
pub use instruction::{Instruction, ANGULAR_TOLERANCE, LINEAR_TOLERANCE, WHEEL_TOLERANCE};
