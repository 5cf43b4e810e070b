use std::fmt;

use thiserror::Error;

use crate::poller::PollOutcome;

/// Register transaction that failed, named by its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    Ping,
    WriteTorqueLimit,
    EnableTorque,
    DisableTorque,
    WriteGoalPosition,
    ReadGoalPosition,
    ReadPresentPosition,
    ReadTorqueLimit,
    ReadTorqueEnable,
}

impl fmt::Display for RegisterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegisterOp::Ping => "ping",
            RegisterOp::WriteTorqueLimit => "write torque limit",
            RegisterOp::EnableTorque => "enable torque",
            RegisterOp::DisableTorque => "disable torque",
            RegisterOp::WriteGoalPosition => "write goal position",
            RegisterOp::ReadGoalPosition => "read goal position",
            RegisterOp::ReadPresentPosition => "read present position",
            RegisterOp::ReadTorqueLimit => "read torque limit",
            RegisterOp::ReadTorqueEnable => "read torque enable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MttError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to open link: {0}")]
    LinkOpen(String),
    #[error("{op}: communication failure {code}: {message}")]
    Comm {
        op: RegisterOp,
        code: i32,
        message: String,
    },
    #[error("{op}: device error {code}: {message}")]
    Device {
        op: RegisterOp,
        code: u8,
        message: String,
    },
    #[error("move did not reach the goal: {0}")]
    MoveIncomplete(PollOutcome),
}

impl MttError {
    /// Register operation the error is attributed to, if any.
    pub fn op(&self) -> Option<RegisterOp> {
        match self {
            MttError::Comm { op, .. } | MttError::Device { op, .. } => Some(*op),
            _ => None,
        }
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
