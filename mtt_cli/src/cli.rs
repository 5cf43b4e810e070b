//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser};
use mtt_config::PortSpec;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();
/// Motor ID of the current run, for error lines.
pub static ACTIVE_ID: OnceLock<u8> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "mtt",
    version,
    about = "Motor test tool for Dynamixel Protocol 1.0 servos",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Goal angle in degrees (-50.0~50.0); enables torque and moves
    #[arg(value_name = "ANGLE", value_parser = parse_angle)]
    pub angle: Option<f32>,

    /// Motor ID (1~255) [default: 1]
    #[arg(short = 'i', value_name = "ID", value_parser = clap::value_parser!(u8).range(1..))]
    pub id: Option<u8>,

    /// Torque limit (0~1023) [default: 200]; written even without a move
    #[arg(short = 'l', value_name = "LIMIT", value_parser = clap::value_parser!(u16).range(0..=1023))]
    pub torque_limit: Option<u16>,

    /// Goal timeout in seconds (1~100) [default: 2]
    #[arg(short = 't', value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=100))]
    pub goal_timeout: Option<u64>,

    /// Slip timeout in seconds (1~10) [default: 1]
    #[arg(short = 'p', value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=10))]
    pub slip_timeout: Option<u64>,

    /// Disable torque after any move
    #[arg(short = 'd', action = ArgAction::SetTrue, overrides_with = "enable")]
    pub disable: bool,

    /// Enable torque
    #[arg(short = 'e', action = ArgAction::SetTrue, overrides_with = "disable")]
    pub enable: bool,

    /// Do not print the status line
    #[arg(short = 'x', action = ArgAction::SetTrue)]
    pub no_status: bool,

    /// Serial port name [default: /dev/ttyS4]
    #[arg(short = 'n', value_name = "PORT")]
    pub port: Option<String>,

    /// Port standard: 232, 422 or 485 [default: 485]
    #[arg(short = 's', value_name = "SPEC", value_parser = parse_port_spec)]
    pub port_spec: Option<PortSpec>,

    /// Baud rate (9600~4000000, standard Dynamixel rates only) [default: 57600]
    #[arg(short = 'b', value_name = "BAUD", value_parser = parse_baud)]
    pub baud: Option<u32>,

    /// Path to config TOML (optional)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the result and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<String>,
}

fn parse_angle(s: &str) -> Result<f32, String> {
    let angle: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("angle must be a number, got {s}"))?;
    if !mtt_core::ANGLE_RANGE.contains(&angle) {
        return Err(format!("angle must be -50.0~50.0, got {s}"));
    }
    Ok(angle)
}

fn parse_port_spec(s: &str) -> Result<PortSpec, String> {
    let n: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("port spec must be 232, 422 or 485, got {s}"))?;
    PortSpec::try_from(n)
}

fn parse_baud(s: &str) -> Result<u32, String> {
    let baud: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("baud rate must be a number, got {s}"))?;
    if !mtt_config::is_supported_baud(baud) {
        return Err(format!("baud rate {baud} is not supported"));
    }
    Ok(baud)
}

fn parse_log_level(s: &str) -> Result<String, String> {
    if !mtt_config::is_log_level(s) {
        return Err(format!(
            "log level must be error, warn, info, debug or trace, got {s}"
        ));
    }
    Ok(s.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_angle_is_positional() {
        let cli = Cli::try_parse_from(["mtt", "-30.5", "-i", "3"]).unwrap();
        assert_eq!(cli.angle, Some(-30.5));
        assert_eq!(cli.id, Some(3));
    }

    #[test]
    fn last_torque_flag_wins() {
        let cli = Cli::try_parse_from(["mtt", "-e", "-d"]).unwrap();
        assert!(cli.disable && !cli.enable);
        let cli = Cli::try_parse_from(["mtt", "-d", "-e"]).unwrap();
        assert!(cli.enable && !cli.disable);
    }

    #[test]
    fn log_level_is_normalized() {
        let cli = Cli::try_parse_from(["mtt", "--log-level", "DEBUG"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for args in [
            &["mtt", "50.1"][..],
            &["mtt", "-i", "0"],
            &["mtt", "-l", "1024"],
            &["mtt", "-t", "0"],
            &["mtt", "-p", "11"],
            &["mtt", "-s", "100"],
            &["mtt", "-b", "12345"],
            &["mtt", "--log-level", "verbose"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?}");
        }
    }
}
