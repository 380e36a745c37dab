//! Drive instruction sum type.
//!
//! Produced fresh every control tick and compared against the previously
//! transmitted instruction with a per-variant tolerance before resending.
//! The wire form is plain text under the `"Ins"` tag, e.g. `forward 29.2`
//! or `combine 14.6 9.7` (always `.` decimals regardless of host locale).

use std::fmt;

/// Resend tolerance for forward/backward speed.
pub const LINEAR_TOLERANCE: f32 = 2.5;

/// Resend tolerance for angular speed (degrees per second).
pub const ANGULAR_TOLERANCE: f32 = 15.0;

/// Resend tolerance for the summed wheel-speed delta of a combine.
pub const WHEEL_TOLERANCE: f32 = 2.5;

/// One drive instruction for the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Stop / no command
    Nothing,
    /// Drive straight ahead at the given speed
    Forward(f32),
    /// Drive straight back at the given speed
    Backward(f32),
    /// Turn left in place at the given angular speed (deg/s)
    Left(f32),
    /// Turn right in place at the given angular speed (deg/s)
    Right(f32),
    /// Differential wheel speeds (wheel 1, wheel 2)
    Combine(f32, f32),
}

impl Instruction {
    /// Signed straight-line speed: positive forward, negative backward,
    /// zero for every non-linear variant.
    pub fn forward_speed(&self) -> f32 {
        match self {
            Instruction::Forward(v) => *v,
            Instruction::Backward(v) => -*v,
            _ => 0.0,
        }
    }

    /// Signed angular speed in deg/s: positive right, negative left,
    /// zero for every non-turning variant.
    pub fn right_angular_speed(&self) -> f32 {
        match self {
            Instruction::Right(w) => *w,
            Instruction::Left(w) => -*w,
            _ => 0.0,
        }
    }

    /// Whether two instructions are close enough that resending is
    /// redundant. Variants must match; `Nothing` is never tolerance-gated.
    pub fn almost_eq(&self, other: &Instruction) -> bool {
        match (self, other) {
            (Instruction::Nothing, Instruction::Nothing) => true,
            (Instruction::Forward(a), Instruction::Forward(b))
            | (Instruction::Backward(a), Instruction::Backward(b)) => {
                (a - b).abs() < LINEAR_TOLERANCE
            }
            (Instruction::Left(a), Instruction::Left(b))
            | (Instruction::Right(a), Instruction::Right(b)) => (a - b).abs() < ANGULAR_TOLERANCE,
            (Instruction::Combine(a1, a2), Instruction::Combine(b1, b2)) => {
                (a1 - b1).abs() + (a2 - b2).abs() < WHEEL_TOLERANCE
            }
            _ => false,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nothing => write!(f, "nothing"),
            Instruction::Forward(v) => write!(f, "forward {}", v),
            Instruction::Backward(v) => write!(f, "backward {}", v),
            Instruction::Left(w) => write!(f, "left {}", w),
            Instruction::Right(w) => write!(f, "right {}", w),
            Instruction::Combine(w1, w2) => write!(f, "combine {} {}", w1, w2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_text_form() {
        assert_eq!(Instruction::Nothing.to_string(), "nothing");
        assert_eq!(Instruction::Forward(29.2).to_string(), "forward 29.2");
        assert_eq!(Instruction::Left(90.0).to_string(), "left 90");
        assert_eq!(Instruction::Combine(14.5, 9.75).to_string(), "combine 14.5 9.75");
    }

    #[test]
    fn signed_speeds() {
        assert_eq!(Instruction::Forward(3.0).forward_speed(), 3.0);
        assert_eq!(Instruction::Backward(3.0).forward_speed(), -3.0);
        assert_eq!(Instruction::Right(45.0).right_angular_speed(), 45.0);
        assert_eq!(Instruction::Left(45.0).right_angular_speed(), -45.0);
    }

    #[test]
    fn tolerance_table() {
        assert!(Instruction::Forward(10.0).almost_eq(&Instruction::Forward(12.0)));
        assert!(!Instruction::Forward(10.0).almost_eq(&Instruction::Forward(12.6)));
        assert!(Instruction::Right(90.0).almost_eq(&Instruction::Right(100.0)));
        assert!(!Instruction::Right(90.0).almost_eq(&Instruction::Right(110.0)));
        assert!(Instruction::Combine(5.0, 5.0).almost_eq(&Instruction::Combine(6.0, 6.0)));
        assert!(!Instruction::Combine(5.0, 5.0).almost_eq(&Instruction::Combine(7.0, 6.0)));
    }

    #[test]
    fn variant_changes_are_never_equal() {
        assert!(!Instruction::Forward(0.1).almost_eq(&Instruction::Backward(0.1)));
        assert!(!Instruction::Nothing.almost_eq(&Instruction::Forward(0.0)));
        assert!(!Instruction::Forward(0.0).almost_eq(&Instruction::Nothing));
    }
}
