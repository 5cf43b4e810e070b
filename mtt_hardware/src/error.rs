use std::fmt;

use thiserror::Error;

/// Transport-level result of a register transaction, numbered like the
/// vendor SDK so diagnostics match what bench operators already know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommResult {
    PortBusy,
    TxFail,
    RxFail,
    TxError,
    RxWaiting,
    RxTimeout,
    RxCorrupt,
    NotAvailable,
}

impl CommResult {
    pub const fn code(self) -> i32 {
        match self {
            CommResult::PortBusy => -1000,
            CommResult::TxFail => -1001,
            CommResult::RxFail => -1002,
            CommResult::TxError => -2000,
            CommResult::RxWaiting => -3000,
            CommResult::RxTimeout => -3001,
            CommResult::RxCorrupt => -3002,
            CommResult::NotAvailable => -9000,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            CommResult::PortBusy => "port is in use",
            CommResult::TxFail => "failed to transmit instruction packet",
            CommResult::RxFail => "failed to get status packet from device",
            CommResult::TxError => "incorrect instruction packet",
            CommResult::RxWaiting => "still receiving status packet",
            CommResult::RxTimeout => "there is no status packet",
            CommResult::RxCorrupt => "incorrect status packet",
            CommResult::NotAvailable => "protocol does not support this function",
        }
    }
}

impl fmt::Display for CommResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Bits of the Protocol 1.0 status-packet error byte, lowest bit first.
const DEVICE_ERROR_BITS: [&str; 7] = [
    "input voltage error",
    "angle limit error",
    "overheating error",
    "out of range error",
    "checksum error",
    "overload error",
    "instruction code error",
];

/// Error byte reported by the servo in its status packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFault(pub u8);

impl DeviceFault {
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Names of the bits set in the error byte.
    pub fn flags(self) -> Vec<&'static str> {
        DEVICE_ERROR_BITS
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.0 & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for DeviceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self.flags();
        if flags.is_empty() {
            write!(f, "unknown device error 0x{:02x}", self.0)
        } else {
            f.write_str(&flags.join(", "))
        }
    }
}

#[derive(Debug, Error)]
pub enum LinkFault {
    #[error("comm result {}: {}", .0.code(), .0)]
    Comm(CommResult),
    #[error("device error {}: {}", .0.code(), .0)]
    Device(DeviceFault),
    #[error("failed to open port {port}: {reason}")]
    Open { port: String, reason: String },
    #[error("link closed")]
    Closed,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LinkFault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_fault_names_every_set_bit() {
        let f = DeviceFault(0b0010_0100);
        assert_eq!(f.flags(), vec!["overheating error", "overload error"]);
        assert_eq!(f.to_string(), "overheating error, overload error");
    }

    #[test]
    fn comm_display_carries_sdk_code() {
        let e = LinkFault::Comm(CommResult::RxTimeout);
        assert_eq!(e.to_string(), "comm result -3001: there is no status packet");
    }
}
