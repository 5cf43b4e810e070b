#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core of the motor test tool (hardware-agnostic).
//!
//! All servo access goes through `mtt_traits::ActuatorLink` and all timing
//! through `mtt_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Conversion**: degrees <-> raw counts (`convert` module)
//! - **Polling**: goal write followed by bounded sampling with goal and slip
//!   clocks (`poller` module)
//! - **Status**: register snapshot and its one-line rendering (`status`)
//! - **Runner**: ping, torque sequencing, move, status (`runner`)
//! - **Session**: link ownership with close-on-drop (`session`)

pub mod config;
pub mod conversions;
pub mod convert;
pub mod error;
pub mod hw_error;
pub mod link;
pub mod mocks;
pub mod poller;
pub mod runner;
pub mod session;
pub mod status;

pub use config::RegisterMap;
pub use convert::{ANGLE_RANGE, to_angle, to_position};
pub use error::{MttError, RegisterOp, Result};
pub use poller::{
    ConvergencePoller, MoveRequest, PollOutcome, PollState, PollStatus, TICK, poll,
};
pub use runner::{RunPlan, RunReport, TorqueAction, run};
pub use session::LinkGuard;
pub use status::{StatusReport, read_status};
