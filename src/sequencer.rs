//! Autonomous idle pose sequencer
//!
//! Walks the [`PoseId`] cycle forever. Every pose passes through two phases,
//! each lasting one dwell period:
//!
//! 1. `PendingApply`: once the dwell elapses, the pose targets are emitted
//!    and the phase timer restarts.
//! 2. `AppliedWaiting`: once the dwell elapses again, the sequencer moves to
//!    the next pose, which starts out pending.
//!
//! The sequencer never touches channels itself; [`PoseSequencer::tick`]
//! returns the pose the caller has to apply.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::pose::PoseId;

/// Sub-step of the current pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerPhase {
    /// Pose targets not issued yet
    PendingApply,
    /// Pose targets issued, waiting out the dwell before advancing
    AppliedWaiting,
}

/// Cyclic pose state machine, paced by the dwell duration
#[derive(Debug, Clone)]
pub struct PoseSequencer {
    pose: PoseId,
    phase: SequencerPhase,
    phase_start: Instant,
    dwell: Duration,
    enabled: bool,
}

impl PoseSequencer {
    /// Create an enabled sequencer at the first pose, apply pending
    pub const fn new(dwell: Duration) -> Self {
        Self {
            pose: PoseId::FIRST,
            phase: SequencerPhase::PendingApply,
            phase_start: Instant::from_millis(0),
            dwell,
            enabled: true,
        }
    }

    pub const fn pose(&self) -> PoseId {
        self.pose
    }

    pub const fn phase(&self) -> SequencerPhase {
        self.phase
    }

    pub const fn phase_start(&self) -> Instant {
        self.phase_start
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mark the first pose as already applied at `now`.
    ///
    /// Used at startup, where the joints are placed in the first pose
    /// directly instead of through the sequencer.
    pub fn start_applied(&mut self, now: Instant) {
        self.pose = PoseId::FIRST;
        self.phase = SequencerPhase::AppliedWaiting;
        self.phase_start = now;
        self.enabled = true;
    }

    /// Enable or disable the sequencer.
    ///
    /// Enabling always restarts the cycle from the first pose with its apply
    /// phase pending, even when already enabled.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        #[cfg(feature = "esp32-log")]
        println!("[PoseSequencer.set_enabled] {:?}", enabled);

        self.enabled = enabled;
        if enabled {
            self.pose = PoseId::FIRST;
            self.phase = SequencerPhase::PendingApply;
            self.phase_start = now;
        }
    }

    /// Advance the phase timer.
    ///
    /// Returns the pose whose targets must be applied now, if any.
    pub fn tick(&mut self, now: Instant) -> Option<PoseId> {
        if !self.enabled {
            return None;
        }
        if now.saturating_duration_since(self.phase_start) < self.dwell {
            return None;
        }

        self.phase_start = now;
        match self.phase {
            SequencerPhase::PendingApply => {
                self.phase = SequencerPhase::AppliedWaiting;
                #[cfg(feature = "esp32-log")]
                println!("[PoseSequencer.tick] applying {}", self.pose.as_str());
                Some(self.pose)
            }
            SequencerPhase::AppliedWaiting => {
                self.pose = self.pose.next();
                self.phase = SequencerPhase::PendingApply;
                #[cfg(feature = "esp32-log")]
                println!("[PoseSequencer.tick] next pose {}", self.pose.as_str());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DWELL: Duration = Duration::from_millis(1500);

    #[test]
    fn test_two_dwell_periods_per_pose() {
        let mut sequencer = PoseSequencer::new(DWELL);
        sequencer.start_applied(Instant::from_millis(0));

        assert_eq!(sequencer.tick(Instant::from_millis(1499)), None);
        assert_eq!(sequencer.pose(), PoseId::Center);

        assert_eq!(sequencer.tick(Instant::from_millis(1500)), None);
        assert_eq!(sequencer.pose(), PoseId::ArmsUp);
        assert_eq!(sequencer.phase(), SequencerPhase::PendingApply);

        assert_eq!(sequencer.tick(Instant::from_millis(2999)), None);
        assert_eq!(
            sequencer.tick(Instant::from_millis(3000)),
            Some(PoseId::ArmsUp)
        );
        assert_eq!(sequencer.phase(), SequencerPhase::AppliedWaiting);
        assert_eq!(sequencer.phase_start(), Instant::from_millis(3000));
    }

    #[test]
    fn test_disabled_sequencer_is_frozen() {
        let mut sequencer = PoseSequencer::new(DWELL);
        sequencer.set_enabled(false, Instant::from_millis(0));
        assert_eq!(sequencer.tick(Instant::from_millis(60_000)), None);
        assert_eq!(sequencer.pose(), PoseId::Center);
        assert_eq!(sequencer.phase(), SequencerPhase::PendingApply);
    }
}
