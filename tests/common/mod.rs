#![allow(dead_code)]

use servo_pose_composer::{
    Instant, PulseSink, ServoController, ServoControllerConfig,
};

/// Sink that remembers every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub begin_calls: Vec<u16>,
    pub writes: Vec<(u8, u16)>,
}

impl PulseSink for RecordingSink {
    fn begin(&mut self, frequency_hz: u16) {
        self.begin_calls.push(frequency_hz);
    }

    fn write(&mut self, slot: u8, pulse: u16) {
        self.writes.push((slot, pulse));
    }
}

/// Controller with the default config, initialized at t = 0
pub fn initialized_controller() -> ServoController<RecordingSink> {
    let mut controller =
        ServoController::new(RecordingSink::default(), &ServoControllerConfig::default())
            .expect("default layout is valid");
    controller.init(Instant::from_millis(0));
    controller
}

/// Tick `count` times, `spacing_ms` apart, starting at `start_ms`.
///
/// Returns the time of the last tick.
pub fn tick_n(
    controller: &mut ServoController<RecordingSink>,
    start_ms: u64,
    spacing_ms: u64,
    count: u64,
) -> u64 {
    let mut t = start_ms;
    for i in 0..count {
        t = start_ms + i * spacing_ms;
        controller.tick(Instant::from_millis(t));
    }
    t
}
