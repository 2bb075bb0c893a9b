use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::angle::{AngleRange, PulseRange};
use crate::command::JointCommand;
use crate::joint::{Joint, JointAngles, JointLayout};
use crate::pose::PoseId;
use crate::sequencer::PoseSequencer;
use crate::servo_channel::{ChannelBank, ChannelError, ServoChannel};
use crate::{DEFAULT_CHANNELS, PulseSink};

/// Motion pacing
#[derive(Debug, Clone, Copy)]
pub struct ServoTimings {
    /// Minimum time between one-degree steps of a channel
    pub step_delay: Duration,
    /// Length of each sequencer phase
    pub pose_dwell: Duration,
}

impl Default for ServoTimings {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(8),
            pose_dwell: Duration::from_millis(1500),
        }
    }
}

/// Configuration for the servo controller
#[derive(Debug, Clone)]
pub struct ServoControllerConfig {
    pub timings: ServoTimings,
    pub pulse: PulseRange,
    /// PWM frequency passed to [`PulseSink::begin`]
    pub frequency_hz: u16,
    pub joints: JointLayout,
    /// Logical range the arms may be commanded to
    pub arm_range: AngleRange,
    /// Logical angles the joints are placed at by [`ServoController::init`]
    pub startup: JointAngles,
}

impl Default for ServoControllerConfig {
    fn default() -> Self {
        Self {
            timings: ServoTimings::default(),
            pulse: PulseRange::default(),
            frequency_hz: 50,
            joints: JointLayout::default(),
            arm_range: AngleRange { min: 0, max: 120 },
            startup: JointAngles::default(),
        }
    }
}

/// Servo controller - owns the channels, the pose sequencer and the sink
///
/// Everything runs on the caller's loop: call [`ServoController::tick`] with
/// the current time as often as possible (at least once per step delay).
/// Setters that need a timestamp use the time of the latest `init`, `tick`
/// or `apply`.
pub struct ServoController<S: PulseSink, const CHANNELS: usize = DEFAULT_CHANNELS> {
    // External dependencies and configuration
    sink: S,
    joints: JointLayout,
    arm_range: AngleRange,
    startup: JointAngles,
    frequency_hz: u16,

    // Internal state
    channels: ChannelBank<CHANNELS>,
    sequencer: PoseSequencer,
    now: Instant,
}

impl<S: PulseSink, const CHANNELS: usize> ServoController<S, CHANNELS> {
    /// Create a new controller.
    ///
    /// Fails if the joint layout names a servo id outside `1..=CHANNELS`, or
    /// gives two joints the same id.
    /// No hardware is touched until [`ServoController::init`].
    pub fn new(sink: S, config: &ServoControllerConfig) -> Result<Self, ChannelError> {
        let channels = ChannelBank::new(config.pulse, config.timings.step_delay);
        let ids = Joint::STEP_ORDER.map(|joint| config.joints.servo_id(joint));
        for (index, &id) in ids.iter().enumerate() {
            channels.get(id)?;
            if ids[..index].contains(&id) {
                return Err(ChannelError::DuplicateChannel(id));
            }
        }

        Ok(Self {
            sink,
            joints: config.joints,
            arm_range: config.arm_range,
            startup: config.startup,
            frequency_hz: config.frequency_hz,
            channels,
            sequencer: PoseSequencer::new(config.timings.pose_dwell),
            now: Instant::from_millis(0),
        })
    }

    /// Reset all channels, start the sink and place the joints at their
    /// startup angles.
    ///
    /// The sequencer starts enabled with the first pose already applied.
    pub fn init(&mut self, now: Instant) {
        self.now = now;
        self.channels.reset();
        self.sink.begin(self.frequency_hz);

        for joint in [Joint::Head, Joint::LeftArm, Joint::RightArm] {
            self.set_joint_angle(joint, self.startup.get(joint));
        }
        self.sequencer.start_applied(now);

        #[cfg(feature = "esp32-log")]
        println!("[ServoController.init] servo controller ready");
    }

    /// Run one control step
    ///
    /// Steps left arm, right arm and head in that order, then lets the
    /// sequencer revise targets. Targets applied here are first stepped
    /// toward on the next tick.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;

        for joint in Joint::STEP_ORDER {
            let id = self.joints.servo_id(joint);
            // Joint ids are validated in `new`.
            let _ = self.channels.step(id, now, &mut self.sink);
        }

        if let Some(pose) = self.sequencer.tick(now) {
            self.apply_pose(pose);
        }
    }

    /// Apply a queued command at `now`
    pub fn apply(&mut self, command: JointCommand, now: Instant) {
        self.now = now;
        match command {
            JointCommand::SetHead(angle) => self.set_head_angle(angle),
            JointCommand::SetLeftArm(angle) => self.set_left_arm_angle(angle),
            JointCommand::SetRightArm(angle) => self.set_right_arm_angle(angle),
            JointCommand::SetAutoPose(enabled) => self.set_auto_pose_enabled(enabled),
        }
    }

    /// Enable or disable the idle pose cycle.
    ///
    /// Disabling leaves in-flight motion running. Enabling restarts the cycle
    /// from the first pose.
    pub fn set_auto_pose_enabled(&mut self, enabled: bool) {
        self.sequencer.set_enabled(enabled, self.now);
    }

    pub const fn is_auto_pose_enabled(&self) -> bool {
        self.sequencer.is_enabled()
    }

    /// Set the head target in logical degrees
    pub fn set_head_angle(&mut self, angle: i16) {
        self.set_joint_angle(Joint::Head, angle);
    }

    /// Set the left arm target in logical (unmirrored) degrees
    pub fn set_left_arm_angle(&mut self, angle: i16) {
        self.set_joint_angle(Joint::LeftArm, angle);
    }

    /// Set the right arm target in logical degrees
    pub fn set_right_arm_angle(&mut self, angle: i16) {
        self.set_joint_angle(Joint::RightArm, angle);
    }

    /// Set any joint target in logical degrees
    ///
    /// The joint transform is applied before the angle reaches the channel.
    pub fn set_joint_angle(&mut self, joint: Joint, angle: i16) {
        let id = self.joints.servo_id(joint);
        let physical = joint.to_physical(angle, self.arm_range);
        // Joint ids are validated in `new`.
        let _ = self
            .channels
            .set_target(id, i16::from(physical), self.now, &mut self.sink);
    }

    /// Set a raw channel target by servo id, bypassing joint transforms
    pub fn set_channel_target(&mut self, id: u8, angle: i16) -> Result<(), ChannelError> {
        self.channels.set_target(id, angle, self.now, &mut self.sink)
    }

    /// Apply a pose's targets right away, leaving the sequencer untouched
    pub fn apply_pose(&mut self, pose: PoseId) {
        let pose = pose.pose();
        for (joint, angle) in pose.targets() {
            self.set_joint_angle(joint, angle);
        }
    }

    /// Physical angle last written for a joint
    pub fn joint_angle(&self, joint: Joint) -> Option<u8> {
        self.joint_channel(joint).current()
    }

    /// Physical target of a joint
    pub fn joint_target(&self, joint: Joint) -> Option<u8> {
        self.joint_channel(joint).target()
    }

    fn joint_channel(&self, joint: Joint) -> ServoChannel {
        self.channels
            .get(self.joints.servo_id(joint))
            .copied()
            .unwrap_or_default()
    }

    pub fn channel(&self, id: u8) -> Result<&ServoChannel, ChannelError> {
        self.channels.get(id)
    }

    pub const fn sequencer(&self) -> &PoseSequencer {
        &self.sequencer
    }

    /// Time of the latest `init`, `tick` or `apply`
    pub const fn now(&self) -> Instant {
        self.now
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }
}
