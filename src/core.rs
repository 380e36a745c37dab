//! Pose and point types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in robot-local metric units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Origin point.
    pub const ZERO: Point2D = Point2D { x: 0.0, y: 0.0 };
}

impl std::ops::Add for Point2D {
    type Output = Point2D;

    #[inline]
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2D {
    type Output = Point2D;

    #[inline]
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Point2D {
    type Output = Point2D;

    #[inline]
    fn mul(self, k: f32) -> Point2D {
        Point2D::new(self.x * k, self.y * k)
    }
}

/// Robot pose in 2D space.
///
/// Position in robot-local metric units, heading in radians. Heading zero
/// points along +Y (the robot's forward axis is `(-sin θ, cos θ)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position
    pub x: f32,
    /// Y position
    pub y: f32,
    /// Heading in radians
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose.
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self { x, y, theta }
    }

    /// Identity pose at origin with zero heading.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }

    /// Position component.
    #[inline]
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Unit vector along the robot's forward axis for this heading.
    #[inline]
    pub fn forward(&self) -> Point2D {
        Point2D::new(-self.theta.sin(), self.theta.cos())
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forward_axis_at_zero_heading_is_plus_y() {
        let pose = Pose2D::identity();
        let f = pose.forward();
        assert_relative_eq!(f.x, 0.0);
        assert_relative_eq!(f.y, 1.0);
    }

    #[test]
    fn point_arithmetic() {
        let p = Point2D::new(1.0, 2.0) + Point2D::new(3.0, -1.0) * 2.0;
        assert_relative_eq!(p.x, 7.0);
        assert_relative_eq!(p.y, 0.0);
    }
}
