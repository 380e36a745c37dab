//! Dead-reckoning pose estimation.
//!
//! Integrates the instructions the controller sends into a continuous pose
//! between authoritative map updates, so the robot indicator keeps moving
//! at display rate. The estimator tracks the robot center; the sensor sits
//! a fixed distance ahead of it along the forward axis `(-sin θ, cos θ)`,
//! and the sensor pose is what map records report and compare against.

use crate::config::RobotGeometry;
use crate::core::{Point2D, Pose2D};
use crate::motion::instruction::Instruction;

/// Wheel-speed difference below which a combine integrates as pure
/// straight-line motion (the turn radius diverges).
const STRAIGHT_EPSILON: f32 = 1e-6;

/// Integrates drive instructions into a center pose.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    pose: Pose2D,
    geometry: RobotGeometry,
}

impl PoseEstimator {
    /// New estimator with the sensor at local origin, heading zero.
    pub fn new(geometry: RobotGeometry) -> Self {
        let mut estimator = Self {
            pose: Pose2D::identity(),
            geometry,
        };
        estimator.restart();
        estimator
    }

    /// Reset to session start: sensor at (0, 0), heading zero.
    pub fn restart(&mut self) {
        self.pose = Pose2D::identity();
        let center = Point2D::ZERO - self.pose.forward() * self.geometry.sensor_offset;
        self.pose.x = center.x;
        self.pose.y = center.y;
    }

    /// Current center pose.
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Pose of the sensor reference point.
    pub fn sensor_pose(&self) -> Pose2D {
        let sensor = self.pose.position() + self.pose.forward() * self.geometry.sensor_offset;
        Pose2D::new(sensor.x, sensor.y, self.pose.theta)
    }

    /// Adopt an authoritative sensor pose reported by the robot.
    pub fn set_sensor_pose(&mut self, sensor: Point2D, orientation: f32) {
        self.pose.theta = orientation;
        let center = sensor - self.pose.forward() * self.geometry.sensor_offset;
        self.pose.x = center.x;
        self.pose.y = center.y;
    }

    /// Integrate one instruction held for `dt` seconds.
    pub fn apply(&mut self, instruction: &Instruction, dt: f32) {
        match *instruction {
            Instruction::Nothing => {}
            Instruction::Forward(_) | Instruction::Backward(_) => {
                self.advance_straight(instruction.forward_speed(), dt);
            }
            Instruction::Left(_) | Instruction::Right(_) => {
                self.pose.theta -= instruction.right_angular_speed().to_radians() * dt;
            }
            Instruction::Combine(w1, w2) => {
                if (w1 - w2).abs() < STRAIGHT_EPSILON {
                    // Equal wheel speeds: the arc degenerates to a line.
                    self.advance_straight((w1 + w2) / 2.0, dt);
                } else {
                    self.advance_arc(w1, w2, dt);
                }
            }
        }
    }

    fn advance_straight(&mut self, speed: f32, dt: f32) {
        let step = self.pose.forward() * (speed * dt);
        self.pose.x += step.x;
        self.pose.y += step.y;
    }

    fn advance_arc(&mut self, w1: f32, w2: f32, dt: f32) {
        let theta = self.pose.theta;
        let r = (self.geometry.wheel_base / 2.0) * (w1 + w2) / (w1 - w2);
        let delta = -dt * (w1 + w2) / (2.0 * r);
        self.pose.x += r * theta.cos() - r * (theta + delta).cos();
        self.pose.y += r * theta.sin() - r * (theta + delta).sin();
        self.pose.theta += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn estimator() -> PoseEstimator {
        PoseEstimator::new(RobotGeometry::default())
    }

    #[test]
    fn restart_places_sensor_at_origin() {
        let est = estimator();
        let sensor = est.sensor_pose();
        assert_relative_eq!(sensor.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(sensor.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(est.pose().y, -7.3, epsilon = 1e-6);
    }

    #[test]
    fn zero_duration_leaves_pose_unchanged() {
        let mut est = estimator();
        let before = est.pose();
        est.apply(&Instruction::Forward(10.0), 0.0);
        est.apply(&Instruction::Right(90.0), 0.0);
        est.apply(&Instruction::Combine(4.0, 2.0), 0.0);
        assert_eq!(est.pose(), before);
    }

    #[test]
    fn forward_at_zero_heading_moves_plus_y() {
        let mut est = estimator();
        let start = est.pose();
        est.apply(&Instruction::Forward(2.0), 1.5);
        assert_relative_eq!(est.pose().x, start.x, epsilon = 1e-6);
        assert_relative_eq!(est.pose().y, start.y + 3.0, epsilon = 1e-5);
        assert_relative_eq!(est.pose().theta, 0.0);
    }

    #[test]
    fn turn_changes_heading_only() {
        let mut est = estimator();
        let start = est.pose();
        est.apply(&Instruction::Right(90.0), 1.0);
        assert_relative_eq!(est.pose().x, start.x);
        assert_relative_eq!(est.pose().y, start.y);
        assert_relative_eq!(est.pose().theta, -std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn equal_wheel_combine_matches_forward() {
        let mut arc = estimator();
        let mut straight = estimator();
        arc.apply(&Instruction::Combine(3.0, 3.0), 2.0);
        straight.apply(&Instruction::Forward(3.0), 2.0);
        assert_relative_eq!(arc.pose().x, straight.pose().x, epsilon = 1e-5);
        assert_relative_eq!(arc.pose().y, straight.pose().y, epsilon = 1e-5);
        assert_relative_eq!(arc.pose().theta, straight.pose().theta);
    }

    #[test]
    fn combine_arc_turns_and_advances() {
        let mut est = estimator();
        let start = est.pose();
        est.apply(&Instruction::Combine(4.0, 2.0), 0.5);
        let pose = est.pose();
        assert!(pose.theta < 0.0, "faster wheel 1 turns clockwise");
        assert!((pose.x - start.x).abs() + (pose.y - start.y).abs() > 0.0);
    }

    #[test]
    fn authoritative_pose_override() {
        let mut est = estimator();
        est.apply(&Instruction::Forward(5.0), 1.0);
        est.set_sensor_pose(Point2D::new(2.0, 3.0), 0.0);
        let sensor = est.sensor_pose();
        assert_relative_eq!(sensor.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(sensor.y, 3.0, epsilon = 1e-5);
    }
}
