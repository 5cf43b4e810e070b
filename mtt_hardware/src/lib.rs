//! Actuator link backends.
//!
//! - [`sim::SimulatedServo`]: always available; used by default builds and tests.
//! - [`protocol1::Protocol1Link`]: Protocol 1.0 over any byte port.
//! - `serial::open` (feature `hardware`): the real bus through `serialport`.
pub mod error;
pub mod protocol1;
#[cfg(feature = "hardware")]
pub mod serial;
pub mod sim;

pub use error::{CommResult, DeviceFault, LinkFault};
pub use protocol1::Protocol1Link;
pub use sim::{SimRegisters, SimulatedServo};
