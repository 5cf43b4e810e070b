//! One-line actuator status.

use std::fmt;

use mtt_traits::ActuatorLink;

use crate::config::RegisterMap;
use crate::convert::to_angle;
use crate::error::{RegisterOp, Result};
use crate::link::read_reg;

/// Register snapshot, raw counts throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub id: u8,
    pub goal: u32,
    pub present: u32,
    pub torque_limit: u32,
    pub torque_enable: u32,
}

impl StatusReport {
    pub fn goal_deg(&self) -> f32 {
        to_angle(self.goal)
    }

    pub fn present_deg(&self) -> f32 {
        to_angle(self.present)
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID:{} GP:{}:{:.1} PP:{}:{:.1} TL:{} TE:{}",
            self.id,
            self.goal,
            self.goal_deg(),
            self.present,
            self.present_deg(),
            self.torque_limit,
            self.torque_enable
        )
    }
}

/// Read goal, present, torque limit and torque enable in that order.
///
/// When `issued_goal` is set the goal register is not read back.
pub fn read_status<L: ActuatorLink + ?Sized>(
    link: &mut L,
    id: u8,
    regs: &RegisterMap,
    issued_goal: Option<u32>,
) -> Result<StatusReport> {
    let goal = match issued_goal {
        Some(goal) => goal,
        None => read_reg(link, id, regs.goal_position, RegisterOp::ReadGoalPosition)?,
    };
    let present = read_reg(
        link,
        id,
        regs.present_position,
        RegisterOp::ReadPresentPosition,
    )?;
    let torque_limit = read_reg(link, id, regs.torque_limit, RegisterOp::ReadTorqueLimit)?;
    let torque_enable = read_reg(link, id, regs.torque_enable, RegisterOp::ReadTorqueEnable)?;
    Ok(StatusReport {
        id,
        goal,
        present,
        torque_limit,
        torque_enable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_like_the_bench_tool() {
        let s = StatusReport {
            id: 1,
            goal: 2617,
            present: 2610,
            torque_limit: 200,
            torque_enable: 1,
        };
        assert_eq!(s.to_string(), "ID:1 GP:2617:50.0 PP:2610:49.4 TL:200 TE:1");
    }

    #[test]
    fn centre_is_zero_degrees() {
        let s = StatusReport {
            id: 7,
            goal: 2048,
            present: 2048,
            torque_limit: 0,
            torque_enable: 0,
        };
        assert_eq!(s.to_string(), "ID:7 GP:2048:0.0 PP:2048:0.0 TL:0 TE:0");
    }
}
