#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the motor test tool.
//!
//! Every section is optional; a missing file or section falls back to the
//! MX-28 / Protocol 1.0 bench defaults. `Config::validate` enforces the same
//! ranges the command line does, so a file can never smuggle in a value the
//! CLI would reject.
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;

use eyre::WrapErr;
use serde::Deserialize;

pub const MOTOR_ID: RangeInclusive<u8> = 1..=255;
pub const TORQUE_LIMIT: RangeInclusive<u16> = 0..=1023;
pub const GOAL_TIMEOUT_S: RangeInclusive<u64> = 1..=100;
pub const SLIP_TIMEOUT_S: RangeInclusive<u64> = 1..=10;

/// Baud rates the bus adapters accept.
pub const SUPPORTED_BAUD_RATES: [u32; 18] = [
    9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800, 500_000, 576_000, 921_600,
    1_000_000, 1_152_000, 1_500_000, 2_000_000, 2_500_000, 3_000_000, 3_500_000, 4_000_000,
];

#[inline]
pub fn is_supported_baud(baud: u32) -> bool {
    SUPPORTED_BAUD_RATES.contains(&baud)
}

/// Level names accepted by `--log-level` and `[logging] level`.
pub fn is_log_level(level: &str) -> bool {
    ["error", "warn", "info", "debug", "trace"]
        .iter()
        .any(|l| l.eq_ignore_ascii_case(level))
}

/// Electrical standard of the serial adapter.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "u16")]
pub enum PortSpec {
    Rs232,
    Rs422,
    #[default]
    Rs485,
}

impl PortSpec {
    pub const fn as_u16(self) -> u16 {
        match self {
            PortSpec::Rs232 => 232,
            PortSpec::Rs422 => 422,
            PortSpec::Rs485 => 485,
        }
    }
}

impl TryFrom<u16> for PortSpec {
    type Error = String;

    fn try_from(v: u16) -> Result<Self, Self::Error> {
        match v {
            232 => Ok(PortSpec::Rs232),
            422 => Ok(PortSpec::Rs422),
            485 => Ok(PortSpec::Rs485),
            other => Err(format!("port spec must be 232, 422 or 485, got {other}")),
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PortCfg {
    pub name: String,
    pub spec: PortSpec,
    pub baud_rate: u32,
    /// Per-transaction status packet timeout.
    pub read_timeout_ms: u64,
}

impl Default for PortCfg {
    fn default() -> Self {
        Self {
            name: "/dev/ttyS4".to_string(),
            spec: PortSpec::Rs485,
            baud_rate: 57_600,
            read_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotorCfg {
    pub id: u8,
    pub torque_limit: u16,
    /// Raw-count tolerance under which the servo counts as "at target".
    pub moving_threshold: u32,
}

impl Default for MotorCfg {
    fn default() -> Self {
        Self {
            id: 1,
            torque_limit: 200,
            moving_threshold: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timeouts {
    /// Whole-move budget in seconds.
    pub goal_s: u64,
    /// Window without observed motion before the move counts as slipped.
    pub slip_s: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            goal_s: 2,
            slip_s: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegisterToml {
    Addr(u16),
    Table { addr: u16, width: Option<u8> },
}

/// One control-table entry. `width` falls back to the role default
/// (1 byte for torque enable, 2 bytes otherwise) when absent.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "RegisterToml")]
pub struct RegisterEntry {
    pub addr: u16,
    pub width: Option<u8>,
}

impl From<RegisterToml> for RegisterEntry {
    fn from(r: RegisterToml) -> Self {
        match r {
            RegisterToml::Addr(addr) => Self { addr, width: None },
            RegisterToml::Table { addr, width } => Self { addr, width },
        }
    }
}

impl RegisterEntry {
    pub const fn at(addr: u16) -> Self {
        Self { addr, width: None }
    }
}

/// Control-table layout of the target model.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Registers {
    pub torque_enable: RegisterEntry,
    pub goal_position: RegisterEntry,
    pub torque_limit: RegisterEntry,
    pub present_position: RegisterEntry,
}

impl Default for Registers {
    fn default() -> Self {
        // MX-28, Protocol 1.0
        Self {
            torque_enable: RegisterEntry::at(24),
            goal_position: RegisterEntry::at(30),
            torque_limit: RegisterEntry::at(34),
            present_position: RegisterEntry::at(36),
        }
    }
}

impl Registers {
    fn entries(&self) -> [(&'static str, RegisterEntry); 4] {
        [
            ("torque_enable", self.torque_enable),
            ("goal_position", self.goal_position),
            ("torque_limit", self.torque_limit),
            ("present_position", self.present_position),
        ]
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // JSON lines
    pub level: Option<String>, // "info","debug"
    /// "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub port: PortCfg,
    pub motor: MotorCfg,
    pub timeouts: Timeouts,
    pub registers: Registers,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is left to the caller so that
/// command-line overrides can be merged first.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Port
        if self.port.name.trim().is_empty() {
            eyre::bail!("port.name must not be empty");
        }
        if !is_supported_baud(self.port.baud_rate) {
            eyre::bail!("port.baud_rate {} is not a supported rate", self.port.baud_rate);
        }
        if self.port.read_timeout_ms == 0 {
            eyre::bail!("port.read_timeout_ms must be >= 1");
        }
        if self.port.read_timeout_ms > 10_000 {
            eyre::bail!("port.read_timeout_ms is unreasonably large (>10s)");
        }

        // Motor
        if !MOTOR_ID.contains(&self.motor.id) {
            eyre::bail!("motor.id must be 1~255");
        }
        if !TORQUE_LIMIT.contains(&self.motor.torque_limit) {
            eyre::bail!("motor.torque_limit must be 0~1023");
        }
        if self.motor.moving_threshold > 4095 {
            eyre::bail!("motor.moving_threshold must be <= 4095");
        }

        // Timeouts
        if !GOAL_TIMEOUT_S.contains(&self.timeouts.goal_s) {
            eyre::bail!("timeouts.goal_s must be 1~100");
        }
        if !SLIP_TIMEOUT_S.contains(&self.timeouts.slip_s) {
            eyre::bail!("timeouts.slip_s must be 1~10");
        }

        // Registers
        let entries = self.registers.entries();
        for (name, entry) in &entries {
            if let Some(w) = entry.width
                && !matches!(w, 1 | 2 | 4)
            {
                eyre::bail!("registers.{name}.width must be 1, 2 or 4");
            }
        }
        for (i, (a, ea)) in entries.iter().enumerate() {
            for (b, eb) in &entries[i + 1..] {
                if ea.addr == eb.addr {
                    eyre::bail!("registers.{a} and registers.{b} share address {}", ea.addr);
                }
            }
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be never, daily or hourly");
        }
        if let Some(l) = self.logging.level.as_deref()
            && !is_log_level(l)
        {
            eyre::bail!("logging.level must be error, warn, info, debug or trace");
        }

        Ok(())
    }
}
