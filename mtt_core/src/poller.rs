//! Bounded convergence poller.
//!
//! After the goal position is written, the present position is sampled once
//! per [`TICK`] until one of the terminal outcomes holds. Two clocks run
//! independently:
//!
//! - the **goal clock** starts when the goal is written and bounds the whole
//!   move;
//! - the **slip clock** starts at the first sample and restarts whenever the
//!   position moves by more than [`MOTION_EPSILON`] counts between samples.
//!
//! Per tick the checks run in a fixed order: slip, goal, cancel, proximity.
//! A timeout seen on the same tick the target is reached still wins.

use std::fmt;
use std::time::{Duration, Instant};

use mtt_traits::{ActuatorLink, Clock, Register};

use crate::config::RegisterMap;
use crate::error::{RegisterOp, Result};
use crate::link::{read_reg, write_reg};

/// Sampling interval. Fixed.
pub const TICK: Duration = Duration::from_millis(100);
/// Largest sample-to-sample change still treated as standing still.
pub const MOTION_EPSILON: u32 = 1;

/// Terminal result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Reached,
    GoalTimedOut,
    Slipped,
    /// Only produced when a cancel check is installed.
    Cancelled,
}

impl PollOutcome {
    /// Stable identifier for structured output.
    pub const fn name(self) -> &'static str {
        match self {
            PollOutcome::Reached => "Reached",
            PollOutcome::GoalTimedOut => "GoalTimedOut",
            PollOutcome::Slipped => "Slipped",
            PollOutcome::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PollOutcome::Reached => "goal reached",
            PollOutcome::GoalTimedOut => "goal timeout expired",
            PollOutcome::Slipped => "motor slipped",
            PollOutcome::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One move-to-target operation. Immutable once polling starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    /// Goal position in raw counts.
    pub target: u32,
    pub goal_timeout: Duration,
    pub slip_timeout: Duration,
    /// Raw-count tolerance for "at target".
    pub moving_threshold: u32,
}

impl MoveRequest {
    #[inline]
    pub fn is_at_target(&self, position: u32) -> bool {
        self.target.abs_diff(position) <= self.moving_threshold
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Polling,
    Done(PollOutcome),
}

#[inline]
fn whole_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Per-move bookkeeping. Times are milliseconds since the poller's epoch.
///
/// Pure: no I/O and no clock access, so the tick logic can be exercised
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    last_position: Option<u32>,
    goal_clock_start_ms: u64,
    slip_clock_start_ms: u64,
}

impl PollState {
    pub fn new(goal_clock_start_ms: u64) -> Self {
        Self {
            last_position: None,
            goal_clock_start_ms,
            // overwritten by the first sample
            slip_clock_start_ms: goal_clock_start_ms,
        }
    }

    pub fn last_position(&self) -> Option<u32> {
        self.last_position
    }

    pub fn slip_clock_start_ms(&self) -> u64 {
        self.slip_clock_start_ms
    }

    /// Fold in a sample taken at `now_ms`.
    pub fn record(&mut self, current: u32, now_ms: u64) {
        match self.last_position {
            None => self.slip_clock_start_ms = now_ms,
            Some(last) if last.abs_diff(current) > MOTION_EPSILON => {
                self.slip_clock_start_ms = now_ms;
            }
            Some(_) => {}
        }
        self.last_position = Some(current);
    }

    /// Evaluate the tick at time `t_ms` for the latest sample `current`.
    pub fn evaluate(
        &self,
        current: u32,
        t_ms: u64,
        cancelled: bool,
        request: &MoveRequest,
    ) -> PollStatus {
        if t_ms.saturating_sub(self.slip_clock_start_ms) >= whole_ms(request.slip_timeout) {
            return PollStatus::Done(PollOutcome::Slipped);
        }
        if t_ms.saturating_sub(self.goal_clock_start_ms) >= whole_ms(request.goal_timeout) {
            return PollStatus::Done(PollOutcome::GoalTimedOut);
        }
        if cancelled {
            return PollStatus::Done(PollOutcome::Cancelled);
        }
        if request.is_at_target(current) {
            return PollStatus::Done(PollOutcome::Reached);
        }
        PollStatus::Polling
    }
}

/// Drives one move on `link` to a terminal [`PollOutcome`].
pub struct ConvergencePoller<'a, L: ActuatorLink + ?Sized, C: Clock> {
    link: &'a mut L,
    clock: C,
    id: u8,
    present: Register,
    request: MoveRequest,
    epoch: Instant,
    state: PollState,
    samples: u32,
    cancel: Option<Box<dyn Fn() -> bool + 'a>>,
}

impl<L: ActuatorLink + ?Sized, C: Clock> fmt::Debug for ConvergencePoller<'_, L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvergencePoller")
            .field("id", &self.id)
            .field("request", &self.request)
            .field("state", &self.state)
            .field("samples", &self.samples)
            .finish()
    }
}

impl<'a, L: ActuatorLink + ?Sized, C: Clock> ConvergencePoller<'a, L, C> {
    /// Write the goal position and start the goal clock.
    ///
    /// A failed write is returned as is; nothing is sampled.
    pub fn start(
        link: &'a mut L,
        clock: C,
        id: u8,
        regs: &RegisterMap,
        request: MoveRequest,
    ) -> Result<Self> {
        write_reg(
            link,
            id,
            regs.goal_position,
            request.target,
            RegisterOp::WriteGoalPosition,
        )?;
        let epoch = clock.now();
        tracing::info!(
            id,
            target = request.target,
            goal_timeout_ms = whole_ms(request.goal_timeout),
            slip_timeout_ms = whole_ms(request.slip_timeout),
            threshold = request.moving_threshold,
            "move start"
        );
        Ok(Self {
            link,
            clock,
            id,
            present: regs.present_position,
            request,
            epoch,
            state: PollState::new(0),
            samples: 0,
            cancel: None,
        })
    }

    /// Install an external cancel check, evaluated after the timeout checks.
    pub fn with_cancel(mut self, cancel: impl Fn() -> bool + 'a) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    pub fn request(&self) -> &MoveRequest {
        &self.request
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Present-position samples taken so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Take one sample and decide. Does not sleep.
    pub fn tick(&mut self) -> Result<PollStatus> {
        let current = read_reg(
            self.link,
            self.id,
            self.present,
            RegisterOp::ReadPresentPosition,
        )?;
        self.samples = self.samples.saturating_add(1);
        self.state.record(current, self.clock.ms_since(self.epoch));

        let t = self.clock.ms_since(self.epoch);
        let cancelled = self.cancel.as_ref().is_some_and(|c| c());
        let status = self.state.evaluate(current, t, cancelled, &self.request);
        tracing::debug!(
            sample = self.samples,
            present = current,
            target = self.request.target,
            slip_ms = t.saturating_sub(self.state.slip_clock_start_ms()),
            goal_ms = t,
            "poll sample"
        );
        Ok(status)
    }

    /// Tick until a terminal outcome, sleeping [`TICK`] between samples.
    pub fn run(mut self) -> Result<PollOutcome> {
        loop {
            match self.tick()? {
                PollStatus::Polling => self.clock.sleep(TICK),
                PollStatus::Done(outcome) => {
                    tracing::info!(
                        id = self.id,
                        outcome = outcome.name(),
                        samples = self.samples,
                        elapsed_ms = self.clock.ms_since(self.epoch),
                        last_position = self.state.last_position(),
                        "move finished"
                    );
                    return Ok(outcome);
                }
            }
        }
    }
}

/// Issue `request` on servo `id` and block until it settles, times out or
/// slips.
pub fn poll<L: ActuatorLink + ?Sized, C: Clock>(
    link: &mut L,
    clock: C,
    id: u8,
    regs: &RegisterMap,
    request: MoveRequest,
) -> Result<PollOutcome> {
    ConvergencePoller::start(link, clock, id, regs, request)?.run()
}
