#![no_std]

pub mod angle;
pub mod command;
pub mod control_loop;
pub mod controller;
pub mod joint;
pub mod mailbox;
pub mod pose;
pub mod sequencer;
pub mod servo_channel;

pub use angle::{AngleRange, PulseRange, clamp_angle};
pub use command::{CommandProcessor, JointCommand};
pub use control_loop::{ControlLoop, TickResult};
pub use controller::{ServoController, ServoControllerConfig, ServoTimings};
pub use joint::{Joint, JointAngles, JointLayout};
pub use mailbox::{CommandMailbox, CommandReceiver, CommandSender, MailboxFull, Posted};
pub use pose::{Pose, PoseId};
pub use sequencer::{PoseSequencer, SequencerPhase};
pub use servo_channel::{ChannelBank, ChannelError, ServoChannel};

pub use embassy_time::{Duration, Instant};

/// Number of output slots on a PCA9685-style servo driver.
pub const DEFAULT_CHANNELS: usize = 16;

/// Abstract pulse-width output
///
/// Implement this trait to drive a concrete PWM chip.
/// The controller is generic over this trait.
pub trait PulseSink {
    /// Initialize the driver at the given PWM frequency.
    ///
    /// Called once, before any channel is written.
    fn begin(&mut self, frequency_hz: u16);

    /// Write a pulse width (in driver ticks) to a 0-based output slot
    fn write(&mut self, slot: u8, pulse: u16);
}
