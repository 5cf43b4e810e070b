//! Test and helper links for mtt_core.

use std::collections::HashMap;
use std::io;

use mtt_traits::{ActuatorLink, LinkError, Register};

/// Link that replays a fixed sequence of present-position samples.
///
/// After the script runs out the last sample repeats. Other registers behave
/// like plain memory seeded by writes. Failures can be injected on a given
/// present-position sample or on writes to a given register.
#[derive(Debug, Clone)]
pub struct ScriptedLink {
    present: Register,
    script: Vec<u32>,
    fail_on_sample: Option<usize>,
    fail_write_to: Option<u16>,
    table: HashMap<u16, u32>,
    model_number: u16,
    /// Present-position reads answered so far, successful or not.
    pub present_reads: usize,
    /// Every write in order: (register, value).
    pub writes: Vec<(Register, u32)>,
    /// Every read in order, including present position.
    pub reads: Vec<Register>,
    pub closed: bool,
}

impl ScriptedLink {
    pub fn new(present: Register, script: impl Into<Vec<u32>>) -> Self {
        Self {
            present,
            script: script.into(),
            fail_on_sample: None,
            fail_write_to: None,
            table: HashMap::new(),
            model_number: 29,
            present_reads: 0,
            writes: Vec::new(),
            reads: Vec::new(),
            closed: false,
        }
    }

    /// Fail the `n`th present-position read (1-based) with a timeout.
    pub fn fail_on_sample(mut self, n: usize) -> Self {
        self.fail_on_sample = Some(n);
        self
    }

    /// Fail every write to the register at `addr`.
    pub fn fail_write_to(mut self, addr: u16) -> Self {
        self.fail_write_to = Some(addr);
        self
    }

    /// Seed a non-present register.
    pub fn with_value(mut self, addr: u16, value: u32) -> Self {
        self.table.insert(addr, value);
        self
    }
}

impl ActuatorLink for ScriptedLink {
    fn ping(&mut self, _id: u8) -> Result<u16, LinkError> {
        Ok(self.model_number)
    }

    fn read(&mut self, _id: u8, reg: Register) -> Result<u32, LinkError> {
        self.reads.push(reg);
        if reg == self.present {
            self.present_reads += 1;
            if self.fail_on_sample == Some(self.present_reads) {
                return Err(Box::new(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "scripted rx timeout",
                )));
            }
            let idx = (self.present_reads - 1).min(self.script.len().saturating_sub(1));
            return Ok(self.script.get(idx).copied().unwrap_or(0));
        }
        Ok(self.table.get(&reg.addr).copied().unwrap_or(0))
    }

    fn write(&mut self, _id: u8, reg: Register, value: u32) -> Result<(), LinkError> {
        if self.fail_write_to == Some(reg.addr) {
            return Err(Box::new(io::Error::other("scripted tx failure")));
        }
        self.writes.push((reg, value));
        self.table.insert(reg.addr, value);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.closed = true;
        Ok(())
    }
}
