//! Serial-port backend (`hardware` feature).

use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use crate::error::{LinkFault, Result};
use crate::protocol1::{Port, Protocol1Link};

/// Everything needed to open the bus.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    /// Electrical standard of the adapter (232, 422 or 485). The USB and
    /// on-board adapters this tool targets switch line drivers themselves,
    /// so the value is only reported.
    pub port_spec: u16,
}

impl Port for Box<dyn SerialPort> {
    fn discard_input(&mut self) -> std::io::Result<()> {
        self.clear(ClearBuffer::Input).map_err(std::io::Error::from)
    }
}

/// Open the port, set the baud rate and wrap it in a Protocol 1.0 link.
pub fn open(settings: &SerialSettings) -> Result<Protocol1Link<Box<dyn SerialPort>>> {
    let port = serialport::new(&settings.port, settings.baud_rate)
        .timeout(settings.read_timeout)
        .open()
        .map_err(|e| LinkFault::Open {
            port: settings.port.clone(),
            reason: e.to_string(),
        })?;
    tracing::info!(
        port = %settings.port,
        baud = settings.baud_rate,
        spec = settings.port_spec,
        "serial port open"
    );
    Ok(Protocol1Link::new(port))
}
