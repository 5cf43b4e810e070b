//! Merge command line, config file and defaults into one validated set of
//! options.

use mtt_config::{Config, PortSpec};
use mtt_core::{MoveRequest, MttError, RegisterMap, RunPlan, to_position};

use crate::cli::Cli;

/// Everything one run needs, resolved once and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub motor_id: u8,
    pub torque_limit: u16,
    pub goal_timeout_s: u64,
    pub slip_timeout_s: u64,
    pub target_angle: Option<f32>,
    pub port_name: String,
    pub port_spec: PortSpec,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub moving_threshold: u32,
    pub registers: RegisterMap,
    /// `-l` was given explicitly.
    pub write_limit: bool,
    pub enable: bool,
    pub disable: bool,
    pub show_status: bool,
    move_request: Option<MoveRequest>,
}

fn config_error(e: &eyre::Report) -> eyre::Report {
    eyre::Report::new(MttError::Config(format!("{e:#}")))
}

/// Read the config file when one was named; otherwise built-in defaults.
pub fn load_config(cli: &Cli) -> eyre::Result<Config> {
    match cli.config.as_deref() {
        Some(path) => mtt_config::load_file(path).map_err(|e| config_error(&e)),
        None => Ok(Config::default()),
    }
}

impl Options {
    /// Command-line values override the config, which overrides defaults.
    pub fn resolve(cli: &Cli, mut cfg: Config) -> eyre::Result<Self> {
        if let Some(id) = cli.id {
            cfg.motor.id = id;
        }
        if let Some(limit) = cli.torque_limit {
            cfg.motor.torque_limit = limit;
        }
        if let Some(goal) = cli.goal_timeout {
            cfg.timeouts.goal_s = goal;
        }
        if let Some(slip) = cli.slip_timeout {
            cfg.timeouts.slip_s = slip;
        }
        if let Some(port) = &cli.port {
            cfg.port.name.clone_from(port);
        }
        if let Some(spec) = cli.port_spec {
            cfg.port.spec = spec;
        }
        if let Some(baud) = cli.baud {
            cfg.port.baud_rate = baud;
        }
        cfg.validate().map_err(|e| config_error(&e))?;

        let move_request = cli
            .angle
            .map(|a| MoveRequest::from_config(u32::from(to_position(a)), &cfg));

        Ok(Self {
            motor_id: cfg.motor.id,
            torque_limit: cfg.motor.torque_limit,
            goal_timeout_s: cfg.timeouts.goal_s,
            slip_timeout_s: cfg.timeouts.slip_s,
            target_angle: cli.angle,
            port_name: cfg.port.name,
            port_spec: cfg.port.spec,
            baud_rate: cfg.port.baud_rate,
            read_timeout_ms: cfg.port.read_timeout_ms,
            moving_threshold: cfg.motor.moving_threshold,
            registers: RegisterMap::from(&cfg.registers),
            write_limit: cli.torque_limit.is_some(),
            enable: cli.enable,
            disable: cli.disable,
            show_status: !cli.no_status,
            move_request,
        })
    }

    pub fn move_request(&self) -> Option<MoveRequest> {
        self.move_request
    }

    pub fn plan(&self) -> RunPlan {
        RunPlan::derive(
            self.motor_id,
            self.torque_limit,
            self.write_limit,
            self.enable,
            self.disable,
            self.move_request,
            self.show_status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mtt_core::TorqueAction;
    use std::time::Duration;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["mtt"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_bench_setup() {
        let o = Options::resolve(&cli(&[]), Config::default()).unwrap();
        assert_eq!(o.motor_id, 1);
        assert_eq!(o.torque_limit, 200);
        assert_eq!(o.port_name, "/dev/ttyS4");
        assert_eq!(o.baud_rate, 57600);
        assert_eq!(o.port_spec, PortSpec::Rs485);
        assert!(o.move_request().is_none());
        assert!(o.show_status);
    }

    #[test]
    fn command_line_beats_config_file() {
        let cfg = mtt_config::load_toml("[motor]\nid = 5\ntorque_limit = 300\n[timeouts]\nslip_s = 3\n")
            .unwrap();
        let o = Options::resolve(&cli(&["-i", "9", "-p", "2"]), cfg).unwrap();
        assert_eq!(o.motor_id, 9);
        assert_eq!(o.torque_limit, 300);
        assert_eq!(o.slip_timeout_s, 2);
    }

    #[test]
    fn angle_builds_move_request() {
        let o = Options::resolve(&cli(&["-50", "-t", "5"]), Config::default()).unwrap();
        let req = o.move_request().unwrap();
        assert_eq!(req.target, 1479);
        assert_eq!(req.goal_timeout, Duration::from_secs(5));
        assert_eq!(req.slip_timeout, Duration::from_secs(1));
        assert_eq!(req.moving_threshold, 10);

        let plan = o.plan();
        assert_eq!(plan.torque_limit, Some(200));
        assert_eq!(plan.torque, TorqueAction::Enable);
    }

    #[test]
    fn command_line_repairs_out_of_range_file_value() {
        let cfg = mtt_config::load_toml("[timeouts]\ngoal_s = 0\n").unwrap();
        let o = Options::resolve(&cli(&["-t", "5"]), cfg).unwrap();
        assert_eq!(o.goal_timeout_s, 5);
    }

    #[test]
    fn unknown_file_log_level_is_a_config_error() {
        let cfg = mtt_config::load_toml("[logging]\nlevel = \"verbose\"\n").unwrap();
        let err = Options::resolve(&cli(&[]), cfg).unwrap_err();
        assert!(matches!(err.downcast_ref::<MttError>(), Some(MttError::Config(_))));
    }

    #[test]
    fn invalid_file_values_are_config_errors() {
        let mut cfg = Config::default();
        cfg.motor.id = 0;
        let err = Options::resolve(&cli(&[]), cfg).unwrap_err();
        assert!(matches!(err.downcast_ref::<MttError>(), Some(MttError::Config(_))));
    }
}
