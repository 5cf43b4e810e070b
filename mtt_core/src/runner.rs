//! One invocation of the tool: ping, torque setup, optional move, status.

use mtt_traits::{ActuatorLink, Clock};

use crate::config::RegisterMap;
use crate::error::{RegisterOp, Result};
use crate::link::{ping, write_reg};
use crate::poller::{ConvergencePoller, MoveRequest, PollOutcome};
use crate::status::{StatusReport, read_status};

/// What to do with torque around the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorqueAction {
    #[default]
    Unchanged,
    /// Enable before the move.
    Enable,
    /// Disable after the move (or on its own when there is none).
    Disable,
}

/// Fully resolved plan for one run. Built once by the front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub id: u8,
    /// Written before torque is enabled.
    pub torque_limit: Option<u16>,
    pub torque: TorqueAction,
    pub goal: Option<MoveRequest>,
    pub show_status: bool,
}

impl RunPlan {
    /// Derive the register actions from front-end choices.
    ///
    /// A move implies writing the torque limit and enabling torque;
    /// `disable` overrides any enable.
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn derive(
        id: u8,
        torque_limit: u16,
        write_limit: bool,
        enable: bool,
        disable: bool,
        goal: Option<MoveRequest>,
        show_status: bool,
    ) -> Self {
        let moving = goal.is_some();
        let torque = if disable {
            TorqueAction::Disable
        } else if enable || moving {
            TorqueAction::Enable
        } else {
            TorqueAction::Unchanged
        };
        Self {
            id,
            torque_limit: (write_limit || moving).then_some(torque_limit),
            torque,
            goal,
            show_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub model_number: u16,
    /// Present when a move was requested.
    pub outcome: Option<PollOutcome>,
    pub status: Option<StatusReport>,
}

impl RunReport {
    /// The move outcome when it was not `Reached`.
    pub fn incomplete(&self) -> Option<PollOutcome> {
        self.outcome.filter(|o| *o != PollOutcome::Reached)
    }
}

/// Execute `plan` against `link`.
///
/// A non-`Reached` outcome still runs the disable and status steps; link
/// errors stop the sequence immediately.
pub fn run<L: ActuatorLink + ?Sized, C: Clock>(
    link: &mut L,
    clock: C,
    regs: &RegisterMap,
    plan: &RunPlan,
    cancel: Option<&dyn Fn() -> bool>,
) -> Result<RunReport> {
    let id = plan.id;
    let model_number = ping(link, id)?;
    tracing::debug!(id, model_number, "ping ok");

    if let Some(limit) = plan.torque_limit {
        write_reg(
            link,
            id,
            regs.torque_limit,
            u32::from(limit),
            RegisterOp::WriteTorqueLimit,
        )?;
    }
    if plan.torque == TorqueAction::Enable {
        write_reg(link, id, regs.torque_enable, 1, RegisterOp::EnableTorque)?;
    }

    let outcome = match plan.goal {
        Some(request) => {
            let mut poller = ConvergencePoller::start(&mut *link, clock, id, regs, request)?;
            if let Some(cancel) = cancel {
                poller = poller.with_cancel(cancel);
            }
            Some(poller.run()?)
        }
        None => None,
    };

    if plan.torque == TorqueAction::Disable {
        write_reg(link, id, regs.torque_enable, 0, RegisterOp::DisableTorque)?;
    }

    let status = if plan.show_status {
        Some(read_status(link, id, regs, plan.goal.map(|g| g.target))?)
    } else {
        None
    };

    Ok(RunReport {
        model_number,
        outcome,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn req() -> MoveRequest {
        MoveRequest {
            target: 2617,
            goal_timeout: Duration::from_secs(2),
            slip_timeout: Duration::from_secs(1),
            moving_threshold: 10,
        }
    }

    #[test]
    fn move_implies_limit_and_enable() {
        let plan = RunPlan::derive(1, 200, false, false, false, Some(req()), true);
        assert_eq!(plan.torque_limit, Some(200));
        assert_eq!(plan.torque, TorqueAction::Enable);
    }

    #[test]
    fn disable_overrides_implied_enable() {
        let plan = RunPlan::derive(1, 200, false, false, true, Some(req()), true);
        assert_eq!(plan.torque, TorqueAction::Disable);
        assert_eq!(plan.torque_limit, Some(200));
    }

    #[test]
    fn status_only_touches_nothing() {
        let plan = RunPlan::derive(3, 200, false, false, false, None, true);
        assert_eq!(plan.torque_limit, None);
        assert_eq!(plan.torque, TorqueAction::Unchanged);
    }

    #[test]
    fn explicit_limit_without_move() {
        let plan = RunPlan::derive(3, 500, true, false, false, None, false);
        assert_eq!(plan.torque_limit, Some(500));
        assert_eq!(plan.torque, TorqueAction::Unchanged);
    }
}
