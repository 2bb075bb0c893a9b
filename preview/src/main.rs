//! Desktop preview app for servo-pose-composer
//!
//! Simulates the head and arm servos on screen with a synthetic clock.
//! Every control change goes through the command mailbox, the same way the
//! robot's web page drives the firmware.

use std::time::Instant as StdInstant;

use eframe::egui::{self};
use servo_pose_composer::{
    CommandMailbox, CommandSender, ControlLoop, Instant, Joint, JointCommand, MailboxFull,
    PoseId, Posted, PulseSink, SequencerPhase, ServoController, ServoControllerConfig,
    control_loop::DEFAULT_TICK_DURATION,
};

/// Number of slots on the simulated PWM driver
const CHANNELS: usize = 16;

/// Command mailbox size
const COMMAND_QUEUE_SIZE: usize = 16;

/// Upper bound on control ticks simulated per UI frame
const MAX_TICKS_PER_FRAME: usize = 4096;

/// Radius of each joint dial in pixels
const DIAL_RADIUS: f32 = 70.0;

/// Static mailbox for communication between UI and control loop
static COMMANDS: CommandMailbox<COMMAND_QUEUE_SIZE> =
    CommandMailbox::<COMMAND_QUEUE_SIZE>::new();

/// Pulse sink that keeps the last pulse written to every slot
#[derive(Debug, Default)]
struct PreviewSink {
    frequency_hz: u16,
    pulses: [Option<u16>; CHANNELS],
    writes: u64,
}

impl PulseSink for PreviewSink {
    fn begin(&mut self, frequency_hz: u16) {
        self.frequency_hz = frequency_hz;
        self.pulses = [None; CHANNELS];
    }

    fn write(&mut self, slot: u8, pulse: u16) {
        if let Some(entry) = self.pulses.get_mut(usize::from(slot)) {
            *entry = Some(pulse);
        }
        self.writes += 1;
    }
}

struct PreviewApp {
    /// The control loop instance
    control: ControlLoop<'static, PreviewSink, CHANNELS, COMMAND_QUEUE_SIZE>,
    /// Command sender for UI changes
    commands: CommandSender<'static, COMMAND_QUEUE_SIZE>,

    /// Synthetic time in milliseconds
    t_ms: u64,
    /// Synthetic time of the next control tick
    next_tick_ms: u64,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    /// Whether the clock is running
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
    /// Manual angle sliders, logical degrees
    manual: [i16; 3],
    /// Result of the last text command
    last_command: String,
}

impl PreviewApp {
    fn new() -> Self {
        let config = ServoControllerConfig::default();
        let controller = ServoController::<PreviewSink, CHANNELS>::new(
            PreviewSink::default(),
            &config,
        )
        .expect("default joint layout fits the driver");
        let control = ControlLoop::new(controller, COMMANDS.receiver(), Instant::from_millis(0));

        Self {
            control,
            commands: COMMANDS.sender(),
            t_ms: 0,
            next_tick_ms: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
            manual: [
                config.startup.left_arm,
                config.startup.right_arm,
                config.startup.head,
            ],
            last_command: String::from("none"),
        }
    }

    /// Queue a command for the next control tick
    fn send(&mut self, command: JointCommand) {
        self.last_command = match self.commands.post(command) {
            Ok(Posted::Queued) => format!("{command:?}"),
            Ok(Posted::Superseded) => format!("{command:?} (replaced queued)"),
            Err(MailboxFull(_)) => String::from("dropped: queue full"),
        };
    }

    /// Queue a `(target, action)` pair like the web page does
    fn send_pair(&mut self, target: &str, action: &str) {
        match JointCommand::parse(target, action) {
            Some(command) => self.send(command),
            None => self.last_command = format!("unknown: {target}={action}"),
        }
    }

    /// Restart the controller and the synthetic clock
    fn reset_time(&mut self) {
        self.t_ms = 0;
        self.next_tick_ms = 0;
        self.last_frame = StdInstant::now();
        self.control.restart(Instant::from_millis(0));
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_ms_f64 = delta.as_secs_f64() * 1000.0 * f64::from(self.time_scale);
            let delta_ms_f64 = if delta_ms_f64.is_finite() {
                delta_ms_f64.max(0.0)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_ms = delta_ms_f64 as u64;
            self.t_ms = self.t_ms.saturating_add(delta_ms);
        }
    }

    /// Run every control tick that falls before the synthetic time
    fn run_control(&mut self) {
        let mut ticks = 0;
        while self.next_tick_ms <= self.t_ms && ticks < MAX_TICKS_PER_FRAME {
            let result = self.control.tick(Instant::from_millis(self.next_tick_ms));
            self.next_tick_ms = result.next_deadline.as_millis();
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            // Too far behind; drop the backlog
            self.next_tick_ms = self.t_ms + DEFAULT_TICK_DURATION.as_millis();
        }
    }
}

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 560.0])
            .with_title("Servo Pose Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "servo-pose-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

/// Draw a half-circle dial with the current angle and the target angle
fn draw_dial(ui: &mut egui::Ui, label: &str, current: Option<u8>, target: Option<u8>) {
    let size = egui::vec2(DIAL_RADIUS * 2.0 + 20.0, DIAL_RADIUS + 50.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let rect = response.rect;
    let center = egui::pos2(rect.center().x, rect.min.y + DIAL_RADIUS + 10.0);

    painter.circle_stroke(
        center,
        DIAL_RADIUS,
        egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
    );

    let needle = |angle: u8, length: f32| {
        let radians = (180.0 - f32::from(angle)).to_radians();
        center + egui::vec2(radians.cos() * length, -radians.sin() * length)
    };

    if let Some(target) = target {
        painter.line_segment(
            [center, needle(target, DIAL_RADIUS)],
            egui::Stroke::new(2.0, egui::Color32::from_rgb(90, 90, 160)),
        );
    }
    if let Some(current) = current {
        painter.line_segment(
            [center, needle(current, DIAL_RADIUS - 8.0)],
            egui::Stroke::new(4.0, egui::Color32::from_rgb(158, 204, 102)),
        );
    }

    let text = match (current, target) {
        (Some(current), Some(target)) => format!("{label}: {current}° → {target}°"),
        _ => format!("{label}: unset"),
    };
    painter.text(
        egui::pos2(center.x, center.y + 12.0),
        egui::Align2::CENTER_TOP,
        text,
        egui::FontId::proportional(14.0),
        egui::Color32::LIGHT_GRAY,
    );
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();
        self.run_control();

        // Request continuous repaint for animation
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            // <PlaybackControls>
            ui.horizontal(|ui| {
                if ui.button("⏮ Reset").clicked() {
                    self.reset_time();
                }
                if ui
                    .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                    .clicked()
                {
                    self.playing = !self.playing;
                }

                ui.add_space(8.0);
                let secs = self.t_ms / 1000;
                let ms = self.t_ms % 1000;
                ui.label(format!("Time: {secs}.{ms:03}s"));

                ui.add_space(8.0);
                ui.label("Speed:");
                ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=5.0).logarithmic(true));
            });
            // </PlaybackControls>

            ui.add_space(8.0);

            // <Sequencer>
            let controller = self.control.controller();
            let sequencer = controller.sequencer();
            let phase = match sequencer.phase() {
                SequencerPhase::PendingApply => "pending apply",
                SequencerPhase::AppliedWaiting => "applied, waiting",
            };
            let mut auto_pose = controller.is_auto_pose_enabled();
            let pose = sequencer.pose();
            ui.horizontal(|ui| {
                if ui.checkbox(&mut auto_pose, "Auto pose").changed() {
                    self.send(JointCommand::SetAutoPose(auto_pose));
                }
                ui.label(format!("Pose: {} ({phase})", pose.as_str()));
            });
            ui.horizontal(|ui| {
                for (index, id) in (0..PoseId::COUNT)
                    .filter_map(|raw| u8::try_from(raw).ok().and_then(PoseId::from_raw))
                    .enumerate()
                {
                    let marker = if id == pose { "●" } else { "○" };
                    ui.label(format!("{marker} {}. {}", index + 1, id.as_str()));
                }
            });
            // </Sequencer>

            ui.add_space(8.0);

            // <Dials>
            let controller = self.control.controller();
            let dials: Vec<(Joint, Option<u8>, Option<u8>)> = Joint::STEP_ORDER
                .into_iter()
                .map(|joint| {
                    let logical = |angle: Option<u8>| angle.map(|a| joint.to_logical(a));
                    (
                        joint,
                        logical(controller.joint_angle(joint)),
                        logical(controller.joint_target(joint)),
                    )
                })
                .collect();
            ui.horizontal(|ui| {
                for (joint, current, target) in &dials {
                    draw_dial(ui, joint.as_str(), *current, *target);
                }
            });
            // </Dials>

            ui.add_space(8.0);

            // <ManualControls>
            ui.horizontal(|ui| {
                ui.label("Head:");
                for action in ["left", "center", "right"] {
                    if ui.button(action).clicked() {
                        self.send_pair("head", action);
                    }
                }
            });
            for (target, label) in [("left_arm", "Left arm:"), ("right_arm", "Right arm:")] {
                ui.horizontal(|ui| {
                    ui.label(label);
                    for action in ["up", "center", "down"] {
                        if ui.button(action).clicked() {
                            self.send_pair(target, action);
                        }
                    }
                });
            }

            ui.add_space(4.0);

            for (index, joint) in Joint::STEP_ORDER.into_iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(format!("{}:", joint.as_str()));
                    let old = self.manual[index];
                    ui.add(egui::Slider::new(&mut self.manual[index], 0..=180));
                    if self.manual[index] != old {
                        self.send(JointCommand::for_joint(joint, self.manual[index]));
                    }
                });
            }
            // </ManualControls>

            ui.add_space(8.0);

            // <Status>
            let sink = self.control.controller().sink();
            ui.label(format!(
                "PWM {} Hz, {} writes, last command: {}",
                sink.frequency_hz, sink.writes, self.last_command
            ));
            let pulses: Vec<String> = sink
                .pulses
                .iter()
                .enumerate()
                .filter_map(|(slot, pulse)| pulse.map(|pulse| format!("#{slot}={pulse}")))
                .collect();
            ui.label(format!("Pulses: {}", pulses.join("  ")));
            // </Status>
        });
    }
}
