//! In-process servo model used when no hardware backend is compiled in.

use std::collections::HashMap;

use mtt_traits::{ActuatorLink, LinkError, Register};

use crate::error::{CommResult, DeviceFault, LinkFault};

/// Control-table addresses the simulator gives physical meaning to.
#[derive(Debug, Clone, Copy)]
pub struct SimRegisters {
    pub torque_enable: u16,
    pub goal_position: u16,
    pub torque_limit: u16,
    pub present_position: u16,
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self {
            torque_enable: 24,
            goal_position: 30,
            torque_limit: 34,
            present_position: 36,
        }
    }
}

/// A single servo on a simulated bus.
///
/// Each read of the present-position register moves the shaft up to
/// `slew_per_sample` counts toward the goal, provided torque is enabled, the
/// torque limit is non-zero and the shaft is not jammed.
#[derive(Debug)]
pub struct SimulatedServo {
    id: u8,
    model_number: u16,
    regs: SimRegisters,
    table: HashMap<u16, u32>,
    slew_per_sample: u32,
    jammed: bool,
    fail_after_reads: Option<(u32, CommResult)>,
    device_error: Option<u8>,
    present_reads: u32,
    writes: Vec<(Register, u32)>,
    closed: bool,
}

impl SimulatedServo {
    pub fn new(id: u8, regs: SimRegisters) -> Self {
        let mut table = HashMap::new();
        table.insert(regs.present_position, 2048);
        table.insert(regs.goal_position, 2048);
        table.insert(regs.torque_limit, 1023);
        table.insert(regs.torque_enable, 0);
        Self {
            id,
            model_number: 29,
            regs,
            table,
            slew_per_sample: 64,
            jammed: false,
            fail_after_reads: None,
            device_error: None,
            present_reads: 0,
            writes: Vec::new(),
            closed: false,
        }
    }

    pub fn with_slew(mut self, counts_per_sample: u32) -> Self {
        self.slew_per_sample = counts_per_sample;
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.table.insert(self.regs.present_position, position);
        self
    }

    pub fn with_torque_enabled(mut self, on: bool) -> Self {
        self.table.insert(self.regs.torque_enable, u32::from(on));
        self
    }

    /// Mechanically block the shaft; the present position stops changing.
    pub fn jammed(mut self) -> Self {
        self.jammed = true;
        self
    }

    /// Fail every present-position read after the first `reads` succeed.
    pub fn fail_after_reads(mut self, reads: u32, result: CommResult) -> Self {
        self.fail_after_reads = Some((reads, result));
        self
    }

    /// Report `code` in the status packet of every transaction.
    pub fn with_device_error(mut self, code: u8) -> Self {
        self.device_error = Some(code);
        self
    }

    pub fn position(&self) -> u32 {
        self.reg(self.regs.present_position)
    }

    pub fn present_reads(&self) -> u32 {
        self.present_reads
    }

    pub fn writes(&self) -> &[(Register, u32)] {
        &self.writes
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn reg(&self, addr: u16) -> u32 {
        self.table.get(&addr).copied().unwrap_or(0)
    }

    fn check_addressed(&self, id: u8) -> Result<(), LinkFault> {
        if self.closed {
            return Err(LinkFault::Closed);
        }
        if id != self.id {
            return Err(LinkFault::Comm(CommResult::RxTimeout));
        }
        if let Some(code) = self.device_error {
            return Err(LinkFault::Device(DeviceFault(code)));
        }
        Ok(())
    }

    fn step_shaft(&mut self) {
        let torque_on = self.reg(self.regs.torque_enable) != 0;
        let limit = self.reg(self.regs.torque_limit);
        if self.jammed || !torque_on || limit == 0 {
            return;
        }
        let present = self.position();
        let goal = self.reg(self.regs.goal_position);
        let next = if goal > present {
            present.saturating_add(self.slew_per_sample).min(goal)
        } else {
            present.saturating_sub(self.slew_per_sample).max(goal)
        };
        self.table.insert(self.regs.present_position, next);
    }
}

impl ActuatorLink for SimulatedServo {
    fn ping(&mut self, id: u8) -> Result<u16, LinkError> {
        self.check_addressed(id)?;
        Ok(self.model_number)
    }

    fn read(&mut self, id: u8, reg: Register) -> Result<u32, LinkError> {
        self.check_addressed(id)?;
        if reg.addr == self.regs.present_position {
            self.present_reads = self.present_reads.saturating_add(1);
            if let Some((ok_reads, result)) = self.fail_after_reads
                && self.present_reads > ok_reads
            {
                return Err(Box::new(LinkFault::Comm(result)));
            }
            self.step_shaft();
        }
        let value = self.reg(reg.addr) & reg.width.max_value();
        tracing::trace!(id, reg = %reg, value, "sim read");
        Ok(value)
    }

    fn write(&mut self, id: u8, reg: Register, value: u32) -> Result<(), LinkError> {
        self.check_addressed(id)?;
        if value > reg.width.max_value() {
            return Err(Box::new(LinkFault::Comm(CommResult::TxError)));
        }
        tracing::trace!(id, reg = %reg, value, "sim write");
        self.writes.push((reg, value));
        self.table.insert(reg.addr, value);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.closed = true;
        Ok(())
    }
}
