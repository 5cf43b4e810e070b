//! Link backend selection.
//!
//! Default builds talk to an in-process simulated servo. With the `hardware`
//! feature the configured serial port is opened instead, unless `MTT_SIM` is
//! set. The simulator is tuned through environment variables:
//!
//! - `MTT_SIM_ID`: ID the simulated servo answers to (default: `-i`)
//! - `MTT_SIM_SLEW`: counts moved per present-position read (default 64)
//! - `MTT_SIM_POSITION`: initial present position (default 2048)
//! - `MTT_SIM_TORQUE_ON`: any value starts the servo with torque enabled
//! - `MTT_SIM_JAM`: any value blocks the shaft
//! - `MTT_SIM_FAIL_AFTER`: present-position reads that succeed before rx timeouts
//! - `MTT_SIM_DEVICE_ERROR`: error byte reported on every transaction

use mtt_core::MttError;
use mtt_hardware::{CommResult, SimRegisters, SimulatedServo};
use mtt_traits::ActuatorLink;

use crate::options::Options;

#[cfg(feature = "hardware")]
const SIM_ENV: &str = "MTT_SIM";

pub fn open(opts: &Options) -> eyre::Result<Box<dyn ActuatorLink>> {
    #[cfg(feature = "hardware")]
    {
        if std::env::var_os(SIM_ENV).is_none() {
            return open_serial(opts);
        }
    }
    Ok(Box::new(simulated(opts)?))
}

#[cfg(feature = "hardware")]
fn open_serial(opts: &Options) -> eyre::Result<Box<dyn ActuatorLink>> {
    use mtt_hardware::serial::{SerialSettings, open};

    let settings = SerialSettings {
        port: opts.port_name.clone(),
        baud_rate: opts.baud_rate,
        read_timeout: std::time::Duration::from_millis(opts.read_timeout_ms),
        port_spec: opts.port_spec.as_u16(),
    };
    let link = open(&settings).map_err(|e| eyre::Report::new(MttError::LinkOpen(e.to_string())))?;
    Ok(Box::new(link))
}

fn env_num<T: std::str::FromStr>(name: &str) -> eyre::Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            eyre::Report::new(MttError::Config(format!("{name} must be a number, got {raw}")))
        }),
        Err(_) => Ok(None),
    }
}

fn simulated(opts: &Options) -> eyre::Result<SimulatedServo> {
    let regs = SimRegisters {
        torque_enable: opts.registers.torque_enable.addr,
        goal_position: opts.registers.goal_position.addr,
        torque_limit: opts.registers.torque_limit.addr,
        present_position: opts.registers.present_position.addr,
    };
    let id = env_num::<u8>("MTT_SIM_ID")?.unwrap_or(opts.motor_id);
    let mut servo = SimulatedServo::new(id, regs);
    if let Some(slew) = env_num("MTT_SIM_SLEW")? {
        servo = servo.with_slew(slew);
    }
    if let Some(position) = env_num("MTT_SIM_POSITION")? {
        servo = servo.with_position(position);
    }
    if std::env::var_os("MTT_SIM_TORQUE_ON").is_some() {
        servo = servo.with_torque_enabled(true);
    }
    if std::env::var_os("MTT_SIM_JAM").is_some() {
        servo = servo.jammed();
    }
    if let Some(reads) = env_num("MTT_SIM_FAIL_AFTER")? {
        servo = servo.fail_after_reads(reads, CommResult::RxTimeout);
    }
    if let Some(code) = env_num("MTT_SIM_DEVICE_ERROR")? {
        servo = servo.with_device_error(code);
    }
    tracing::info!(
        port = %opts.port_name,
        spec = %opts.port_spec,
        baud = opts.baud_rate,
        read_timeout_ms = opts.read_timeout_ms,
        sim_id = id,
        "using simulated servo"
    );
    Ok(servo)
}
