//! Register helpers that attach the failing operation to link errors.

use mtt_traits::{ActuatorLink, Register};

use crate::error::{RegisterOp, Result};
use crate::hw_error::map_link_error;

pub fn read_reg<L: ActuatorLink + ?Sized>(
    link: &mut L,
    id: u8,
    reg: Register,
    op: RegisterOp,
) -> Result<u32> {
    link.read(id, reg)
        .map_err(|e| eyre::Report::new(map_link_error(&*e, op)))
}

pub fn write_reg<L: ActuatorLink + ?Sized>(
    link: &mut L,
    id: u8,
    reg: Register,
    value: u32,
    op: RegisterOp,
) -> Result<()> {
    link.write(id, reg, value)
        .map_err(|e| eyre::Report::new(map_link_error(&*e, op)))
}

pub fn ping<L: ActuatorLink + ?Sized>(link: &mut L, id: u8) -> Result<u16> {
    link.ping(id)
        .map_err(|e| eyre::Report::new(map_link_error(&*e, RegisterOp::Ping)))
}
