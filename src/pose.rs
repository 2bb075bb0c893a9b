//! Pose catalog
//!
//! Every pose is a compile-time table of logical joint angles. A pose may
//! leave joints out; those keep whatever target they already had.

use crate::joint::Joint;

const POSE_NAME_CENTER: &str = "center";
const POSE_NAME_ARMS_UP: &str = "arms_up";
const POSE_NAME_CENTER_AGAIN: &str = "center_again";
const POSE_NAME_ARMS_DOWN: &str = "arms_down";
const POSE_NAME_HEAD_LEFT: &str = "head_left";
const POSE_NAME_HEAD_RIGHT: &str = "head_right";

const POSE_ID_CENTER: u8 = 0;
const POSE_ID_ARMS_UP: u8 = 1;
const POSE_ID_CENTER_AGAIN: u8 = 2;
const POSE_ID_ARMS_DOWN: u8 = 3;
const POSE_ID_HEAD_LEFT: u8 = 4;
const POSE_ID_HEAD_RIGHT: u8 = 5;

pub const HEAD_CENTER_ANGLE: i16 = 90;
pub const HEAD_LEFT_ANGLE: i16 = 0;
pub const HEAD_RIGHT_ANGLE: i16 = 180;
pub const ARM_UP_ANGLE: i16 = 120;
pub const ARM_CENTER_ANGLE: i16 = 60;
pub const ARM_DOWN_ANGLE: i16 = 0;

/// Named set of logical joint targets applied together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    pub head: Option<i16>,
    pub left_arm: Option<i16>,
    pub right_arm: Option<i16>,
}

impl Pose {
    const CENTER: Self = Self {
        head: Some(HEAD_CENTER_ANGLE),
        left_arm: Some(ARM_CENTER_ANGLE),
        right_arm: Some(ARM_CENTER_ANGLE),
    };
    const ARMS_UP: Self = Self::arms(ARM_UP_ANGLE);
    const ARMS_DOWN: Self = Self::arms(ARM_DOWN_ANGLE);
    const HEAD_LEFT: Self = Self::head(HEAD_LEFT_ANGLE);
    const HEAD_RIGHT: Self = Self::head(HEAD_RIGHT_ANGLE);

    const fn arms(angle: i16) -> Self {
        Self {
            head: None,
            left_arm: Some(angle),
            right_arm: Some(angle),
        }
    }

    const fn head(angle: i16) -> Self {
        Self {
            head: Some(angle),
            left_arm: None,
            right_arm: None,
        }
    }

    /// Logical target for a joint, if the pose touches it
    pub const fn target(&self, joint: Joint) -> Option<i16> {
        match joint {
            Joint::LeftArm => self.left_arm,
            Joint::RightArm => self.right_arm,
            Joint::Head => self.head,
        }
    }

    /// Iterate the joints this pose sets, in step order
    pub fn targets(&self) -> impl Iterator<Item = (Joint, i16)> + '_ {
        Joint::STEP_ORDER
            .into_iter()
            .filter_map(move |joint| self.target(joint).map(|angle| (joint, angle)))
    }
}

/// States of the idle pose cycle, in cycle order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PoseId {
    Center = POSE_ID_CENTER,
    ArmsUp = POSE_ID_ARMS_UP,
    CenterAgain = POSE_ID_CENTER_AGAIN,
    ArmsDown = POSE_ID_ARMS_DOWN,
    HeadLeft = POSE_ID_HEAD_LEFT,
    HeadRight = POSE_ID_HEAD_RIGHT,
}

impl PoseId {
    /// First pose of the cycle
    pub const FIRST: Self = Self::Center;

    /// Number of poses in the cycle
    pub const COUNT: usize = 6;

    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            POSE_ID_CENTER => Self::Center,
            POSE_ID_ARMS_UP => Self::ArmsUp,
            POSE_ID_CENTER_AGAIN => Self::CenterAgain,
            POSE_ID_ARMS_DOWN => Self::ArmsDown,
            POSE_ID_HEAD_LEFT => Self::HeadLeft,
            POSE_ID_HEAD_RIGHT => Self::HeadRight,
            _ => return None,
        })
    }

    /// Cyclic successor; the last pose wraps to the first
    pub const fn next(self) -> Self {
        match self {
            Self::Center => Self::ArmsUp,
            Self::ArmsUp => Self::CenterAgain,
            Self::CenterAgain => Self::ArmsDown,
            Self::ArmsDown => Self::HeadLeft,
            Self::HeadLeft => Self::HeadRight,
            Self::HeadRight => Self::Center,
        }
    }

    /// Joint targets for this pose
    pub const fn pose(self) -> Pose {
        match self {
            Self::Center | Self::CenterAgain => Pose::CENTER,
            Self::ArmsUp => Pose::ARMS_UP,
            Self::ArmsDown => Pose::ARMS_DOWN,
            Self::HeadLeft => Pose::HEAD_LEFT,
            Self::HeadRight => Pose::HEAD_RIGHT,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => POSE_NAME_CENTER,
            Self::ArmsUp => POSE_NAME_ARMS_UP,
            Self::CenterAgain => POSE_NAME_CENTER_AGAIN,
            Self::ArmsDown => POSE_NAME_ARMS_DOWN,
            Self::HeadLeft => POSE_NAME_HEAD_LEFT,
            Self::HeadRight => POSE_NAME_HEAD_RIGHT,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            POSE_NAME_CENTER => Some(Self::Center),
            POSE_NAME_ARMS_UP => Some(Self::ArmsUp),
            POSE_NAME_CENTER_AGAIN => Some(Self::CenterAgain),
            POSE_NAME_ARMS_DOWN => Some(Self::ArmsDown),
            POSE_NAME_HEAD_LEFT => Some(Self::HeadLeft),
            POSE_NAME_HEAD_RIGHT => Some(Self::HeadRight),
            _ => None,
        }
    }
}
