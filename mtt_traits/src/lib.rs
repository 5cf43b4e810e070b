//! Seams between the motor test tool core and the outside world.
//!
//! - [`ActuatorLink`]: register access to one servo bus (real or simulated).
//! - [`Clock`]: monotonic time, swappable for a virtual clock in tests.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::fmt;

/// Error type crossing the link boundary. Backends box their own error types;
/// the core downcasts the ones it knows.
pub type LinkError = Box<dyn std::error::Error + Send + Sync>;

/// Width of a control-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegWidth {
    Byte,
    Word,
    Long,
}

impl RegWidth {
    pub const fn bytes(self) -> u8 {
        match self {
            RegWidth::Byte => 1,
            RegWidth::Word => 2,
            RegWidth::Long => 4,
        }
    }

    /// Width from a byte count, if supported.
    pub const fn from_bytes(n: u8) -> Option<Self> {
        match n {
            1 => Some(RegWidth::Byte),
            2 => Some(RegWidth::Word),
            4 => Some(RegWidth::Long),
            _ => None,
        }
    }

    /// Largest value that fits the register.
    pub const fn max_value(self) -> u32 {
        match self {
            RegWidth::Byte => 0xFF,
            RegWidth::Word => 0xFFFF,
            RegWidth::Long => u32::MAX,
        }
    }
}

/// Opaque control-table register identifier: address plus width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    pub addr: u16,
    pub width: RegWidth,
}

impl Register {
    pub const fn new(addr: u16, width: RegWidth) -> Self {
        Self { addr, width }
    }

    pub const fn byte(addr: u16) -> Self {
        Self::new(addr, RegWidth::Byte)
    }

    pub const fn word(addr: u16) -> Self {
        Self::new(addr, RegWidth::Word)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}B", self.addr, self.width.bytes())
    }
}

/// Register-level access to servos on one bus.
///
/// Implementations own the transport; framing, checksums and any transport
/// level retries live behind this trait. Every call is a single blocking
/// transaction.
pub trait ActuatorLink {
    /// Probe `id`; returns the model number.
    fn ping(&mut self, id: u8) -> Result<u16, LinkError>;

    fn read(&mut self, id: u8, reg: Register) -> Result<u32, LinkError>;

    fn write(&mut self, id: u8, reg: Register, value: u32) -> Result<(), LinkError>;

    /// Release the transport. Further calls may fail.
    fn close(&mut self) -> Result<(), LinkError>;
}

impl<L: ActuatorLink + ?Sized> ActuatorLink for Box<L> {
    fn ping(&mut self, id: u8) -> Result<u16, LinkError> {
        (**self).ping(id)
    }

    fn read(&mut self, id: u8, reg: Register) -> Result<u32, LinkError> {
        (**self).read(id, reg)
    }

    fn write(&mut self, id: u8, reg: Register, value: u32) -> Result<(), LinkError> {
        (**self).write(id, reg, value)
    }

    fn close(&mut self) -> Result<(), LinkError> {
        (**self).close()
    }
}
