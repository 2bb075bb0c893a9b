//! Joint commands and their processing
//!
//! External controls (the web page, a serial console, the preview app) speak
//! in `(target, action)` pairs such as `("head", "left")` or
//! `("right_arm", "75")`. They are parsed into [`JointCommand`]s, queued in a
//! [`CommandMailbox`] and applied by the control loop through the same manual
//! override path as direct setter calls.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use embassy_time::Instant;

use crate::PulseSink;
use crate::controller::ServoController;
use crate::joint::Joint;
use crate::mailbox::CommandReceiver;
use crate::pose::{
    ARM_CENTER_ANGLE, ARM_DOWN_ANGLE, ARM_UP_ANGLE, HEAD_CENTER_ANGLE, HEAD_LEFT_ANGLE,
    HEAD_RIGHT_ANGLE,
};

const TARGET_AUTO_POSE: &str = "auto_pose";

const ACTION_LEFT: &str = "left";
const ACTION_CENTER: &str = "center";
const ACTION_RIGHT: &str = "right";
const ACTION_UP: &str = "up";
const ACTION_DOWN: &str = "down";
const ACTION_ON: &str = "on";
const ACTION_OFF: &str = "off";

/// A single manual control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointCommand {
    /// Move the head to a logical angle
    SetHead(i16),
    /// Move the left arm to a logical angle
    SetLeftArm(i16),
    /// Move the right arm to a logical angle
    SetRightArm(i16),
    /// Enable (restart) or disable the idle pose cycle
    SetAutoPose(bool),
}

impl JointCommand {
    /// Build the setter command for a joint
    pub const fn for_joint(joint: Joint, angle: i16) -> Self {
        match joint {
            Joint::LeftArm => Self::SetLeftArm(angle),
            Joint::RightArm => Self::SetRightArm(angle),
            Joint::Head => Self::SetHead(angle),
        }
    }

    /// Joint moved by this command, if any
    pub const fn joint(self) -> Option<Joint> {
        match self {
            Self::SetHead(_) => Some(Joint::Head),
            Self::SetLeftArm(_) => Some(Joint::LeftArm),
            Self::SetRightArm(_) => Some(Joint::RightArm),
            Self::SetAutoPose(_) => None,
        }
    }

    /// True when both commands drive the same joint, or both toggle the
    /// pose cycle. Applying `self` after `other` erases the effect of `other`.
    pub const fn same_kind(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::SetHead(_), Self::SetHead(_))
                | (Self::SetLeftArm(_), Self::SetLeftArm(_))
                | (Self::SetRightArm(_), Self::SetRightArm(_))
                | (Self::SetAutoPose(_), Self::SetAutoPose(_))
        )
    }

    /// Parse a `(target, action)` pair.
    ///
    /// Joints accept named positions (`left`/`center`/`right` for the head,
    /// `up`/`center`/`down` for the arms) or a decimal angle. `auto_pose`
    /// accepts `on` and `off`.
    pub fn parse(target: &str, action: &str) -> Option<Self> {
        let command = Self::parse_pair(target, action);

        #[cfg(feature = "esp32-log")]
        if command.is_none() {
            println!("[JointCommand.parse] unknown: {}={}", target, action);
        }

        command
    }

    fn parse_pair(target: &str, action: &str) -> Option<Self> {
        if target == TARGET_AUTO_POSE {
            return match action {
                ACTION_ON => Some(Self::SetAutoPose(true)),
                ACTION_OFF => Some(Self::SetAutoPose(false)),
                _ => None,
            };
        }

        let joint = Joint::parse_from_str(target)?;
        let angle = match (joint, action) {
            (Joint::Head, ACTION_LEFT) => HEAD_LEFT_ANGLE,
            (Joint::Head, ACTION_CENTER) => HEAD_CENTER_ANGLE,
            (Joint::Head, ACTION_RIGHT) => HEAD_RIGHT_ANGLE,
            (Joint::LeftArm | Joint::RightArm, ACTION_UP) => ARM_UP_ANGLE,
            (Joint::LeftArm | Joint::RightArm, ACTION_CENTER) => ARM_CENTER_ANGLE,
            (Joint::LeftArm | Joint::RightArm, ACTION_DOWN) => ARM_DOWN_ANGLE,
            (_, raw) => raw.trim().parse::<i16>().ok()?,
        };
        Some(Self::for_joint(joint, angle))
    }
}

/// Drains queued commands into a controller
pub struct CommandProcessor<'a, const SIZE: usize> {
    commands: CommandReceiver<'a, SIZE>,
}

impl<'a, const SIZE: usize> CommandProcessor<'a, SIZE> {
    pub const fn new(commands: CommandReceiver<'a, SIZE>) -> Self {
        Self { commands }
    }

    /// Apply every pending command in arrival order at `now` (non-blocking).
    ///
    /// Returns the number of commands applied.
    pub fn process_pending<S: PulseSink, const CHANNELS: usize>(
        &mut self,
        controller: &mut ServoController<S, CHANNELS>,
        now: Instant,
    ) -> usize {
        let mut applied = 0;
        while let Some(command) = self.commands.take() {
            #[cfg(feature = "esp32-log")]
            println!("[CommandProcessor.process_pending] {:?}", command);
            controller.apply(command, now);
            applied += 1;
        }
        applied
    }
}
