//! Maps `Box<dyn Error>` from the link boundary to typed `MttError`.
//!
//! `mtt_traits::ActuatorLink` returns boxed errors; this module recovers the
//! transport code or device error byte, with a feature-gated downcast to
//! `mtt_hardware::LinkFault` and a string fallback for foreign backends.

use crate::error::{MttError, RegisterOp};

/// Transport code used when a foreign backend gives no better information.
const FALLBACK_TX_FAIL: i32 = -1001;
const FALLBACK_RX_TIMEOUT: i32 = -3001;

/// Map a link error to a typed `MttError`, attributed to `op`.
pub fn map_link_error(e: &(dyn std::error::Error + 'static), op: RegisterOp) -> MttError {
    #[cfg(feature = "hardware-errors")]
    {
        use mtt_hardware::{CommResult, LinkFault};
        if let Some(fault) = e.downcast_ref::<LinkFault>() {
            return match fault {
                LinkFault::Comm(result) => MttError::Comm {
                    op,
                    code: result.code(),
                    message: result.description().to_string(),
                },
                LinkFault::Device(dev) => MttError::Device {
                    op,
                    code: dev.code(),
                    message: dev.to_string(),
                },
                LinkFault::Open { .. } => MttError::LinkOpen(fault.to_string()),
                LinkFault::Closed => MttError::Comm {
                    op,
                    code: CommResult::PortBusy.code(),
                    message: fault.to_string(),
                },
                LinkFault::Io(io) => MttError::Comm {
                    op,
                    code: CommResult::RxFail.code(),
                    message: io.to_string(),
                },
            };
        }
    }

    let message = e.to_string();
    let code = if message.to_lowercase().contains("timeout") {
        FALLBACK_RX_TIMEOUT
    } else {
        FALLBACK_TX_FAIL
    };
    MttError::Comm { op, code, message }
}
