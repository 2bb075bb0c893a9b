//! Per-channel angle state and the one-degree-per-step interpolator
//!
//! Each channel walks its current angle toward the target by exactly one
//! degree whenever at least `step_delay` has passed since its previous step.
//! Channels are independent; nothing here coordinates motion across joints.

use core::fmt;

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::PulseSink;
use crate::angle::{PulseRange, clamp_angle};

/// Errors returned by channel setters and layout checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Servo id outside `1..=CHANNELS`
    InvalidChannel(u8),
    /// Servo id assigned to more than one joint
    DuplicateChannel(u8),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(id) => write!(f, "invalid servo id: {}", id),
            Self::DuplicateChannel(id) => write!(f, "servo id {} used by two joints", id),
        }
    }
}

impl core::error::Error for ChannelError {}

/// State of one servo channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoChannel {
    /// Angle last written to hardware; `None` until the first target arrives
    current: Option<u8>,
    /// Commanded angle, always within `0..=180`
    target: u8,
    /// Time of the last write to hardware
    last_step: Instant,
}

impl ServoChannel {
    /// Create an unset channel
    pub const fn new() -> Self {
        Self {
            current: None,
            target: 0,
            last_step: Instant::from_millis(0),
        }
    }

    /// Angle last written to hardware
    pub const fn current(&self) -> Option<u8> {
        self.current
    }

    /// Commanded angle, `None` while the channel is unset
    pub const fn target(&self) -> Option<u8> {
        match self.current {
            Some(_) => Some(self.target),
            None => None,
        }
    }

    /// Time of the last hardware write
    pub const fn last_step(&self) -> Instant {
        self.last_step
    }

    /// Check if the channel still has distance to cover
    pub const fn is_moving(&self) -> bool {
        match self.current {
            Some(current) => current != self.target,
            None => false,
        }
    }

    /// Store a new target.
    ///
    /// An unset channel jumps straight to the target; the returned angle must
    /// then be written to hardware. Otherwise returns `None` and motion is
    /// left to [`ServoChannel::step`].
    pub fn set_target(&mut self, angle: u8, now: Instant) -> Option<u8> {
        let angle = clamp_angle(i16::from(angle));
        self.target = angle;
        if self.current.is_some() {
            return None;
        }
        self.current = Some(angle);
        self.last_step = now;
        Some(angle)
    }

    /// Advance one degree toward the target if the step delay has elapsed.
    ///
    /// Returns the new angle when the channel moved.
    pub fn step(&mut self, now: Instant, step_delay: Duration) -> Option<u8> {
        let current = self.current?;
        if current == self.target {
            return None;
        }
        if now.saturating_duration_since(self.last_step) < step_delay {
            return None;
        }

        let next = if self.target > current {
            current + 1
        } else {
            current - 1
        };
        self.current = Some(next);
        self.last_step = now;
        Some(next)
    }
}

impl Default for ServoChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed set of servo channels sharing one pulse sink
///
/// Channels are addressed by 1-based servo id; id `n` drives sink slot `n - 1`.
#[derive(Debug, Clone)]
pub struct ChannelBank<const CHANNELS: usize> {
    channels: [ServoChannel; CHANNELS],
    pulse: PulseRange,
    step_delay: Duration,
}

impl<const CHANNELS: usize> ChannelBank<CHANNELS> {
    /// Create a bank with every channel unset
    pub const fn new(pulse: PulseRange, step_delay: Duration) -> Self {
        Self {
            channels: [ServoChannel::new(); CHANNELS],
            pulse,
            step_delay,
        }
    }

    /// Return every channel to the unset state
    pub fn reset(&mut self) {
        self.channels = [ServoChannel::new(); CHANNELS];
    }

    /// Get a channel by servo id
    pub fn get(&self, id: u8) -> Result<&ServoChannel, ChannelError> {
        let slot = Self::slot(id)?;
        Ok(&self.channels[slot])
    }

    /// Set a channel target, clamping the angle into `0..=180`.
    ///
    /// Unset channels are written to the sink immediately. On an invalid id
    /// nothing is mutated and the sink is untouched.
    pub fn set_target<S: PulseSink>(
        &mut self,
        id: u8,
        angle: i16,
        now: Instant,
        sink: &mut S,
    ) -> Result<(), ChannelError> {
        let slot = Self::slot(id).inspect_err(|_err| {
            #[cfg(feature = "esp32-log")]
            println!("[ChannelBank.set_target] rejected: {}", _err);
        })?;

        if let Some(angle) = self.channels[slot].set_target(clamp_angle(angle), now) {
            Self::write(sink, self.pulse, slot, angle);
        }
        Ok(())
    }

    /// Step a channel toward its target.
    ///
    /// Returns true if the channel moved and the sink was written.
    pub fn step<S: PulseSink>(
        &mut self,
        id: u8,
        now: Instant,
        sink: &mut S,
    ) -> Result<bool, ChannelError> {
        let slot = Self::slot(id)?;
        let Some(angle) = self.channels[slot].step(now, self.step_delay) else {
            return Ok(false);
        };
        Self::write(sink, self.pulse, slot, angle);
        Ok(true)
    }

    /// Convert a 1-based servo id to a 0-based slot index
    fn slot(id: u8) -> Result<usize, ChannelError> {
        let index = usize::from(id);
        if index == 0 || index > CHANNELS {
            return Err(ChannelError::InvalidChannel(id));
        }
        Ok(index - 1)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write<S: PulseSink>(sink: &mut S, pulse: PulseRange, slot: usize, angle: u8) {
        sink.write(slot as u8, pulse.pulse_for(angle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(8);

    #[test]
    fn test_unset_channel_does_not_step() {
        let mut channel = ServoChannel::new();
        assert_eq!(channel.step(Instant::from_millis(100), STEP), None);
        assert_eq!(channel.current(), None);
        assert_eq!(channel.target(), None);
    }

    #[test]
    fn test_first_target_teleports() {
        let mut channel = ServoChannel::new();
        assert_eq!(channel.set_target(45, Instant::from_millis(3)), Some(45));
        assert_eq!(channel.current(), Some(45));
        assert_eq!(channel.last_step(), Instant::from_millis(3));
        assert_eq!(channel.set_target(50, Instant::from_millis(4)), None);
        assert_eq!(channel.current(), Some(45));
        assert!(channel.is_moving());
    }

    #[test]
    fn test_step_is_rate_limited() {
        let mut channel = ServoChannel::new();
        channel.set_target(10, Instant::from_millis(0));
        channel.set_target(12, Instant::from_millis(0));

        assert_eq!(channel.step(Instant::from_millis(7), STEP), None);
        assert_eq!(channel.step(Instant::from_millis(8), STEP), Some(11));
        assert_eq!(channel.step(Instant::from_millis(10), STEP), None);
        assert_eq!(channel.step(Instant::from_millis(16), STEP), Some(12));
        assert_eq!(channel.step(Instant::from_millis(100), STEP), None);
        assert!(!channel.is_moving());
    }

    #[test]
    fn test_slot_bounds() {
        assert_eq!(ChannelBank::<16>::slot(1), Ok(0));
        assert_eq!(ChannelBank::<16>::slot(16), Ok(15));
        assert_eq!(
            ChannelBank::<16>::slot(0),
            Err(ChannelError::InvalidChannel(0))
        );
        assert_eq!(
            ChannelBank::<16>::slot(17),
            Err(ChannelError::InvalidChannel(17))
        );
    }
}
