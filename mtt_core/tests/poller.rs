use std::cell::Cell;
use std::time::Duration;

use mtt_core::mocks::ScriptedLink;
use mtt_core::{ConvergencePoller, MoveRequest, MttError, PollOutcome, RegisterMap, RegisterOp, poll};
use mtt_hardware::{CommResult, SimRegisters, SimulatedServo};
use mtt_traits::ManualClock;
use rstest::rstest;

fn request(target: u32, goal_s: u64, slip_s: u64) -> MoveRequest {
    MoveRequest {
        target,
        goal_timeout: Duration::from_secs(goal_s),
        slip_timeout: Duration::from_secs(slip_s),
        moving_threshold: 10,
    }
}

fn servo() -> SimulatedServo {
    SimulatedServo::new(1, SimRegisters::default()).with_torque_enabled(true)
}

#[test]
fn converging_servo_reaches_goal_before_timeouts() {
    let clock = ManualClock::new();
    let mut link = servo().with_slew(64);
    let out = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 2, 1)).unwrap();

    assert_eq!(out, PollOutcome::Reached);
    // 569 counts at 64 per sample: at goal on the 9th sample
    assert_eq!(link.present_reads(), 9);
    assert_eq!(clock.elapsed(), Duration::from_millis(800));
    assert_eq!(link.position(), 2617);
}

#[test]
fn already_at_target_returns_on_first_sample() {
    let clock = ManualClock::new();
    let mut link = servo();
    let out = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2050, 2, 1)).unwrap();
    assert_eq!(out, PollOutcome::Reached);
    assert_eq!(link.present_reads(), 1);
    assert_eq!(clock.sleeps(), 0);
}

#[test]
fn jammed_servo_slips_at_slip_timeout() {
    let clock = ManualClock::new();
    let mut link = servo().jammed();
    let out = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 2, 1)).unwrap();

    assert_eq!(out, PollOutcome::Slipped);
    assert_eq!(clock.elapsed(), Duration::from_millis(1000));
    assert!(clock.elapsed() < Duration::from_secs(2));
    assert_eq!(link.present_reads(), 11);
}

#[test]
fn stalled_servo_times_out_when_slip_exceeds_goal() {
    let clock = ManualClock::new();
    let mut link = servo().jammed();
    let out = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 1, 2)).unwrap();

    assert_eq!(out, PollOutcome::GoalTimedOut);
    assert_eq!(clock.elapsed(), Duration::from_millis(1000));
}

#[test]
fn one_count_per_sample_is_not_progress() {
    let clock = ManualClock::new();
    let mut link = servo().with_slew(1);
    let out = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 2, 1)).unwrap();
    assert_eq!(out, PollOutcome::Slipped);
    assert_eq!(link.position(), 2048 + 11);
}

#[test]
fn slow_but_moving_servo_hits_goal_timeout() {
    let clock = ManualClock::new();
    let mut link = servo().with_slew(10);
    let out = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 1, 1)).unwrap();
    assert_eq!(out, PollOutcome::GoalTimedOut);
    assert_eq!(link.present_reads(), 11);
}

#[rstest]
#[case::rx_timeout(CommResult::RxTimeout, -3001)]
#[case::rx_corrupt(CommResult::RxCorrupt, -3002)]
#[case::tx_fail(CommResult::TxFail, -1001)]
fn read_failure_stops_sampling(#[case] result: CommResult, #[case] code: i32) {
    let clock = ManualClock::new();
    let mut link = servo().fail_after_reads(3, result);
    let err = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 2, 1))
        .unwrap_err();

    match err.downcast_ref::<MttError>() {
        Some(MttError::Comm { op, code: got, .. }) => {
            assert_eq!(*op, RegisterOp::ReadPresentPosition);
            assert_eq!(*got, code);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(link.present_reads(), 4);
    assert_eq!(clock.sleeps(), 3);
}

#[test]
fn goal_write_failure_takes_no_samples() {
    let clock = ManualClock::new();
    let mut link = servo().with_device_error(0x20);
    let err = poll(&mut link, clock.clone(), 1, &RegisterMap::default(), request(2617, 2, 1))
        .unwrap_err();

    match err.downcast_ref::<MttError>() {
        Some(MttError::Device { op, code, message }) => {
            assert_eq!(*op, RegisterOp::WriteGoalPosition);
            assert_eq!(*code, 0x20);
            assert!(message.contains("overload"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(link.present_reads(), 0);
    assert_eq!(clock.elapsed(), Duration::ZERO);
}

#[test]
fn goal_is_written_before_first_sample() {
    let regs = RegisterMap::default();
    let mut link = ScriptedLink::new(regs.present_position, vec![2617]);
    poll(&mut link, ManualClock::new(), 1, &regs, request(2617, 2, 1)).unwrap();
    assert_eq!(link.writes, vec![(regs.goal_position, 2617)]);
    assert_eq!(link.reads, vec![regs.present_position]);
}

#[test]
fn cancel_check_ends_the_move() {
    let regs = RegisterMap::default();
    let mut link = ScriptedLink::new(regs.present_position, vec![1500, 1600, 1700, 1800, 1900]);
    let checks = Cell::new(0u32);
    let poller = ConvergencePoller::start(&mut link, ManualClock::new(), 1, &regs, request(2617, 2, 1))
        .unwrap()
        .with_cancel(|| {
            checks.set(checks.get() + 1);
            checks.get() >= 3
        });
    assert_eq!(poller.run().unwrap(), PollOutcome::Cancelled);
    assert_eq!(link.present_reads, 3);
}

#[test]
fn idle_cancel_check_leaves_slip_detection_alone() {
    let regs = RegisterMap::default();
    let mut link = ScriptedLink::new(regs.present_position, vec![1500]);
    let poller = ConvergencePoller::start(&mut link, ManualClock::new(), 1, &regs, request(2617, 2, 1))
        .unwrap()
        .with_cancel(|| false);
    assert_eq!(poller.run().unwrap(), PollOutcome::Slipped);
}

#[test]
fn tick_reports_polling_until_done() {
    let regs = RegisterMap::default();
    let mut link = ScriptedLink::new(regs.present_position, vec![2000, 2300, 2612]);
    let mut poller =
        ConvergencePoller::start(&mut link, ManualClock::new(), 1, &regs, request(2617, 2, 1)).unwrap();

    assert_eq!(poller.tick().unwrap(), mtt_core::PollStatus::Polling);
    assert_eq!(poller.tick().unwrap(), mtt_core::PollStatus::Polling);
    assert_eq!(
        poller.tick().unwrap(),
        mtt_core::PollStatus::Done(PollOutcome::Reached)
    );
    assert_eq!(poller.samples(), 3);
    assert_eq!(poller.state().last_position(), Some(2612));
}
