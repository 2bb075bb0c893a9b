//! Physical joints and their logical-to-physical angle transforms
//!
//! Poses and manual overrides speak in logical joint angles. Before an angle
//! reaches a servo channel, arms are clamped to their restricted range and the
//! left arm is mirrored, since it is mounted facing the opposite way.

use crate::angle::{AngleRange, MAX_ANGLE};

const JOINT_NAME_LEFT_ARM: &str = "left_arm";
const JOINT_NAME_RIGHT_ARM: &str = "right_arm";
const JOINT_NAME_HEAD: &str = "head";

/// Articulated joint driven by one servo channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Joint {
    LeftArm,
    RightArm,
    Head,
}

impl Joint {
    /// Joints in the order they are stepped on every tick
    pub const STEP_ORDER: [Self; 3] = [Self::LeftArm, Self::RightArm, Self::Head];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeftArm => JOINT_NAME_LEFT_ARM,
            Self::RightArm => JOINT_NAME_RIGHT_ARM,
            Self::Head => JOINT_NAME_HEAD,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            JOINT_NAME_LEFT_ARM => Some(Self::LeftArm),
            JOINT_NAME_RIGHT_ARM => Some(Self::RightArm),
            JOINT_NAME_HEAD => Some(Self::Head),
            _ => None,
        }
    }

    /// Convert a logical angle to the physical servo angle.
    ///
    /// Arms are clamped to `arm_range`; the left arm is then mirrored.
    /// The head only gets the full-sweep clamp.
    pub const fn to_physical(self, angle: i16, arm_range: AngleRange) -> u8 {
        match self {
            Self::LeftArm => MAX_ANGLE - arm_range.clamp(angle),
            Self::RightArm => arm_range.clamp(angle),
            Self::Head => AngleRange::FULL.clamp(angle),
        }
    }

    /// Inverse of [`Joint::to_physical`] for reporting purposes
    pub const fn to_logical(self, physical: u8) -> u8 {
        match self {
            Self::LeftArm => MAX_ANGLE.saturating_sub(physical),
            Self::RightArm | Self::Head => physical,
        }
    }
}

/// Servo ids (1-based) assigned to each joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointLayout {
    pub left_arm: u8,
    pub right_arm: u8,
    pub head: u8,
}

impl JointLayout {
    pub const fn servo_id(&self, joint: Joint) -> u8 {
        match joint {
            Joint::LeftArm => self.left_arm,
            Joint::RightArm => self.right_arm,
            Joint::Head => self.head,
        }
    }
}

impl Default for JointLayout {
    fn default() -> Self {
        Self {
            left_arm: 1,
            right_arm: 2,
            head: 3,
        }
    }
}

/// One logical angle per joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointAngles {
    pub head: i16,
    pub left_arm: i16,
    pub right_arm: i16,
}

impl JointAngles {
    pub const fn get(&self, joint: Joint) -> i16 {
        match joint {
            Joint::LeftArm => self.left_arm,
            Joint::RightArm => self.right_arm,
            Joint::Head => self.head,
        }
    }
}

impl Default for JointAngles {
    fn default() -> Self {
        Self {
            head: 90,
            left_arm: 60,
            right_arm: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARMS: AngleRange = AngleRange { min: 0, max: 120 };

    #[test]
    fn test_left_arm_is_mirrored() {
        assert_eq!(Joint::LeftArm.to_physical(60, ARMS), 120);
        assert_eq!(Joint::LeftArm.to_physical(0, ARMS), 180);
        assert_eq!(Joint::LeftArm.to_physical(170, ARMS), 60);
    }

    #[test]
    fn test_right_arm_and_head() {
        assert_eq!(Joint::RightArm.to_physical(170, ARMS), 120);
        assert_eq!(Joint::RightArm.to_physical(-3, ARMS), 0);
        assert_eq!(Joint::Head.to_physical(170, ARMS), 170);
        assert_eq!(Joint::Head.to_physical(999, ARMS), 180);
    }

    #[test]
    fn test_logical_round_trip() {
        assert_eq!(Joint::LeftArm.to_logical(120), 60);
        assert_eq!(Joint::Head.to_logical(45), 45);
    }
}
