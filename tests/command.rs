mod common;

mod tests {
    use embassy_time::{Duration, Instant};
    use servo_pose_composer::{
        CommandMailbox, CommandProcessor, ControlLoop, Joint, JointCommand, MailboxFull, Posted,
        SequencerPhase, ServoController, ServoControllerConfig,
    };

    use super::common::{RecordingSink, initialized_controller};

    #[test]
    fn test_parse_named_positions() {
        assert_eq!(
            JointCommand::parse("head", "left"),
            Some(JointCommand::SetHead(0))
        );
        assert_eq!(
            JointCommand::parse("head", "center"),
            Some(JointCommand::SetHead(90))
        );
        assert_eq!(
            JointCommand::parse("head", "right"),
            Some(JointCommand::SetHead(180))
        );
        assert_eq!(
            JointCommand::parse("left_arm", "up"),
            Some(JointCommand::SetLeftArm(120))
        );
        assert_eq!(
            JointCommand::parse("right_arm", "center"),
            Some(JointCommand::SetRightArm(60))
        );
        assert_eq!(
            JointCommand::parse("right_arm", "down"),
            Some(JointCommand::SetRightArm(0))
        );
    }

    #[test]
    fn test_parse_angles_and_toggles() {
        assert_eq!(
            JointCommand::parse("right_arm", "75"),
            Some(JointCommand::SetRightArm(75))
        );
        assert_eq!(
            JointCommand::parse("head", " -20 "),
            Some(JointCommand::SetHead(-20))
        );
        assert_eq!(
            JointCommand::parse("auto_pose", "off"),
            Some(JointCommand::SetAutoPose(false))
        );
        assert_eq!(
            JointCommand::parse("auto_pose", "on"),
            Some(JointCommand::SetAutoPose(true))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(JointCommand::parse("tail", "up"), None);
        assert_eq!(JointCommand::parse("head", "up"), None);
        assert_eq!(JointCommand::parse("left_arm", "left"), None);
        assert_eq!(JointCommand::parse("auto_pose", "maybe"), None);
        assert_eq!(JointCommand::parse("motion", "forward"), None);
    }

    #[test]
    fn test_command_joint() {
        assert_eq!(
            JointCommand::for_joint(Joint::LeftArm, 10),
            JointCommand::SetLeftArm(10)
        );
        assert_eq!(JointCommand::SetHead(3).joint(), Some(Joint::Head));
        assert_eq!(JointCommand::SetAutoPose(true).joint(), None);
    }

    #[test]
    fn test_command_kinds() {
        assert!(JointCommand::SetHead(1).same_kind(JointCommand::SetHead(2)));
        assert!(JointCommand::SetAutoPose(true).same_kind(JointCommand::SetAutoPose(false)));
        assert!(!JointCommand::SetLeftArm(1).same_kind(JointCommand::SetRightArm(1)));
        assert!(!JointCommand::SetHead(1).same_kind(JointCommand::SetAutoPose(true)));
    }

    #[test]
    fn test_mailbox_is_bounded() {
        let mailbox: CommandMailbox<2> = CommandMailbox::new();
        let sender = mailbox.sender();
        assert_eq!(sender.post(JointCommand::SetHead(1)), Ok(Posted::Queued));
        assert_eq!(sender.post(JointCommand::SetLeftArm(2)), Ok(Posted::Queued));
        assert_eq!(
            sender.post(JointCommand::SetRightArm(3)),
            Err(MailboxFull(JointCommand::SetRightArm(3)))
        );

        let receiver = mailbox.receiver();
        assert_eq!(receiver.take(), Some(JointCommand::SetHead(1)));
        assert_eq!(receiver.take(), Some(JointCommand::SetLeftArm(2)));
        assert_eq!(receiver.take(), None);
    }

    #[test]
    fn test_full_mailbox_supersedes_newest_same_joint() {
        let mailbox: CommandMailbox<3> = CommandMailbox::new();
        let sender = mailbox.sender();
        sender.post(JointCommand::SetHead(1)).unwrap();
        sender.post(JointCommand::SetAutoPose(false)).unwrap();
        sender.post(JointCommand::SetHead(2)).unwrap();

        assert_eq!(sender.post(JointCommand::SetHead(3)), Ok(Posted::Superseded));
        assert_eq!(
            sender.post(JointCommand::SetAutoPose(true)),
            Ok(Posted::Superseded)
        );

        let receiver = mailbox.receiver();
        assert_eq!(receiver.take(), Some(JointCommand::SetHead(1)));
        assert_eq!(receiver.take(), Some(JointCommand::SetAutoPose(true)));
        assert_eq!(receiver.take(), Some(JointCommand::SetHead(3)));
        assert_eq!(receiver.take(), None);
    }

    #[test]
    fn test_processor_applies_in_arrival_order() {
        let mailbox: CommandMailbox<4> = CommandMailbox::new();
        let sender = mailbox.sender();
        let mut processor = CommandProcessor::new(mailbox.receiver());
        let mut controller = initialized_controller();
        let now = Instant::from_millis(0);

        sender.post(JointCommand::SetAutoPose(false)).unwrap();
        sender.post(JointCommand::SetHead(20)).unwrap();
        sender.post(JointCommand::SetHead(40)).unwrap();

        assert_eq!(processor.process_pending(&mut controller, now), 3);
        assert!(!controller.is_auto_pose_enabled());
        assert_eq!(controller.joint_target(Joint::Head), Some(40));
        assert_eq!(processor.process_pending(&mut controller, now), 0);
    }

    #[test]
    fn test_overflowing_commands_end_in_same_state() {
        let mailbox: CommandMailbox<2> = CommandMailbox::new();
        let sender = mailbox.sender();
        let mut processor = CommandProcessor::new(mailbox.receiver());
        let mut controller = initialized_controller();

        for angle in [10, 20, 30, 40] {
            sender.post(JointCommand::SetHead(angle)).unwrap();
        }
        assert_eq!(
            processor.process_pending(&mut controller, Instant::from_millis(0)),
            2
        );
        assert_eq!(controller.joint_target(Joint::Head), Some(40));
    }

    #[test]
    fn test_control_loop_pacing() {
        let mailbox: CommandMailbox<4> = CommandMailbox::new();
        let controller: ServoController<RecordingSink> =
            ServoController::new(RecordingSink::default(), &ServoControllerConfig::default())
                .unwrap();
        let mut control = ControlLoop::with_tick_duration(
            controller,
            mailbox.receiver(),
            Instant::from_millis(0),
            Duration::from_millis(4),
        );
        assert_eq!(control.controller().sink().begin_calls, vec![50]);

        let result = control.tick(Instant::from_millis(0));
        assert_eq!(result.next_deadline, Instant::from_millis(4));
        assert_eq!(result.sleep_duration, Duration::from_millis(4));

        let result = control.tick(Instant::from_millis(5));
        assert_eq!(result.next_deadline, Instant::from_millis(8));
        assert_eq!(result.sleep_duration, Duration::from_millis(3));

        // Fell far behind: the schedule restarts from now
        let result = control.tick(Instant::from_millis(100));
        assert_eq!(result.next_deadline, Instant::from_millis(104));
        assert_eq!(result.sleep_duration, Duration::from_millis(4));
    }

    #[test]
    fn test_control_loop_applies_commands_before_stepping() {
        let mailbox: CommandMailbox<4> = CommandMailbox::new();
        let sender = mailbox.sender();
        let controller: ServoController<RecordingSink> =
            ServoController::new(RecordingSink::default(), &ServoControllerConfig::default())
                .unwrap();
        let mut control = ControlLoop::new(controller, mailbox.receiver(), Instant::from_millis(0));

        sender.post(JointCommand::SetAutoPose(false)).unwrap();
        sender
            .post(JointCommand::parse("head", "right").unwrap())
            .unwrap();

        let result = control.tick(Instant::from_millis(8));
        assert_eq!(result.commands_applied, 2);
        assert!(!control.controller().is_auto_pose_enabled());
        assert_eq!(control.controller().joint_target(Joint::Head), Some(180));
        assert_eq!(control.controller().joint_angle(Joint::Head), Some(91));

        control.controller_mut().set_head_angle(91);
        let result = control.tick(Instant::from_millis(16));
        assert_eq!(result.commands_applied, 0);
        assert_eq!(control.controller().joint_angle(Joint::Head), Some(91));
    }

    #[test]
    fn test_queued_enable_restarts_cycle_at_tick_time() {
        let mailbox: CommandMailbox<4> = CommandMailbox::new();
        let sender = mailbox.sender();
        let controller: ServoController<RecordingSink> =
            ServoController::new(RecordingSink::default(), &ServoControllerConfig::default())
                .unwrap();
        let mut control = ControlLoop::new(controller, mailbox.receiver(), Instant::from_millis(0));

        sender.post(JointCommand::SetAutoPose(false)).unwrap();
        let mut t = 0;
        while t <= 100 {
            control.tick(Instant::from_millis(t));
            t += 4;
        }
        assert!(!control.controller().is_auto_pose_enabled());

        sender.post(JointCommand::SetAutoPose(true)).unwrap();
        control.tick(Instant::from_millis(104));

        let sequencer = control.controller().sequencer();
        assert!(sequencer.is_enabled());
        assert_eq!(sequencer.phase(), SequencerPhase::PendingApply);
        assert_eq!(sequencer.phase_start(), Instant::from_millis(104));
    }
}
