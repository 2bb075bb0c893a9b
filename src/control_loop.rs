//! Control loop pacing.
//!
//! Provides portable tick pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between ticks.

use embassy_time::{Duration, Instant};

use crate::command::CommandProcessor;
use crate::mailbox::CommandReceiver;
use crate::{PulseSink, ServoController};

/// Default control rate (250 Hz), twice the default step rate.
pub const DEFAULT_TICK_HZ: u32 = 250;

/// Default tick period based on the control rate.
pub const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(1000 / DEFAULT_TICK_HZ as u64);

/// Result of a loop tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
    /// Number of queued commands applied during this tick.
    pub commands_applied: usize,
}

/// Portable control loop that drives a [`ServoController`].
///
/// Each tick:
/// - Applies queued commands (manual overrides, auto-pose toggles)
/// - Steps the servo channels and the pose sequencer
/// - Returns timing info so the caller can sleep appropriately
///
/// # Usage
///
/// ```ignore
/// static COMMANDS: CommandMailbox<8> = CommandMailbox::new();
///
/// let controller = ServoController::new(pwm, &ServoControllerConfig::default())?;
/// let mut control = ControlLoop::new(controller, COMMANDS.receiver(), Instant::now());
///
/// loop {
///     let result = control.tick(Instant::now());
///     Timer::after(result.sleep_duration).await;
/// }
/// ```
pub struct ControlLoop<'a, S: PulseSink, const CHANNELS: usize, const QUEUE_SIZE: usize> {
    controller: ServoController<S, CHANNELS>,
    commands: CommandProcessor<'a, QUEUE_SIZE>,
    next_tick: Instant,
    tick_duration: Duration,
}

impl<'a, S: PulseSink, const CHANNELS: usize, const QUEUE_SIZE: usize>
    ControlLoop<'a, S, CHANNELS, QUEUE_SIZE>
{
    /// Create a control loop and initialize the controller at `now`.
    ///
    /// Uses `DEFAULT_TICK_DURATION` for pacing.
    pub fn new(
        controller: ServoController<S, CHANNELS>,
        commands: CommandReceiver<'a, QUEUE_SIZE>,
        now: Instant,
    ) -> Self {
        Self::with_tick_duration(controller, commands, now, DEFAULT_TICK_DURATION)
    }

    /// Create a control loop with a custom tick period.
    pub fn with_tick_duration(
        mut controller: ServoController<S, CHANNELS>,
        commands: CommandReceiver<'a, QUEUE_SIZE>,
        now: Instant,
        tick_duration: Duration,
    ) -> Self {
        controller.init(now);
        Self {
            controller,
            commands: CommandProcessor::new(commands),
            next_tick: now,
            tick_duration,
        }
    }

    /// Run one loop iteration and return timing information.
    ///
    /// This method:
    /// 1. Resets the schedule if we've fallen more than two periods behind
    /// 2. Applies pending commands at `now`
    /// 3. Ticks the controller
    /// 4. Returns the deadline for the next tick
    pub fn tick(&mut self, now: Instant) -> TickResult {
        // Skip the backlog after a stall instead of bursting through it
        let max_drift = self.tick_duration * 2;
        if now > self.next_tick + max_drift {
            self.next_tick = now;
        }

        let commands_applied = self.commands.process_pending(&mut self.controller, now);
        self.controller.tick(now);

        self.next_tick += self.tick_duration;
        let sleep_duration = self.next_tick.saturating_duration_since(now);

        TickResult {
            next_deadline: self.next_tick,
            sleep_duration,
            commands_applied,
        }
    }

    /// Re-initialize the controller and restart the schedule at `now`.
    ///
    /// Pending commands stay queued and are applied on the next tick.
    pub fn restart(&mut self, now: Instant) {
        self.controller.init(now);
        self.next_tick = now;
    }

    /// Get a reference to the controller.
    pub fn controller(&self) -> &ServoController<S, CHANNELS> {
        &self.controller
    }

    /// Get a mutable reference to the controller.
    pub fn controller_mut(&mut self) -> &mut ServoController<S, CHANNELS> {
        &mut self.controller
    }
}
