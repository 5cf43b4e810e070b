use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use mtt_core::mocks::ScriptedLink;
use mtt_core::{ConvergencePoller, MoveRequest, PollState, RegisterMap, poll};
use mtt_hardware::{SimRegisters, SimulatedServo};
use mtt_traits::ManualClock;
use std::time::Duration;

fn request(target: u32) -> MoveRequest {
    MoveRequest {
        target,
        goal_timeout: Duration::from_secs(100),
        slip_timeout: Duration::from_secs(10),
        moving_threshold: 10,
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let req = request(2617);
    let mut state = PollState::new(0);
    state.record(2048, 0);
    c.bench_function("poll_state_evaluate", |b| {
        b.iter(|| state.evaluate(black_box(2100), black_box(500), false, &req));
    });
}

fn bench_tick(c: &mut Criterion) {
    let regs = RegisterMap::default();
    c.bench_function("poller_tick_scripted", |b| {
        b.iter_batched(
            || ScriptedLink::new(regs.present_position, vec![1000u32, 1100, 1200, 1300]),
            |mut link| {
                let mut poller =
                    ConvergencePoller::start(&mut link, ManualClock::new(), 1, &regs, request(4000))
                        .unwrap();
                for _ in 0..4 {
                    black_box(poller.tick().unwrap());
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_full_move(c: &mut Criterion) {
    let regs = RegisterMap::default();
    c.bench_function("poll_full_move_simulated", |b| {
        b.iter_batched(
            || {
                SimulatedServo::new(1, SimRegisters::default())
                    .with_torque_enabled(true)
                    .with_slew(8)
            },
            |mut servo| black_box(poll(&mut servo, ManualClock::new(), 1, &regs, request(2617)).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_evaluate, bench_tick, bench_full_move);
criterion_main!(benches);
