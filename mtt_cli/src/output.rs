//! Result rendering: one status line, or one JSON line with `--json`.

use mtt_core::{RunReport, StatusReport};
use serde_json::{Value, json};

use crate::options::Options;

fn status_json(s: &StatusReport) -> Value {
    json!({
        "goal": s.goal,
        "goal_deg": s.goal_deg(),
        "present": s.present,
        "present_deg": s.present_deg(),
        "torque_limit": s.torque_limit,
        "torque_enable": s.torque_enable,
    })
}

pub fn report_json(opts: &Options, report: &RunReport) -> Value {
    json!({
        "id": opts.motor_id,
        "model_number": report.model_number,
        "target_angle": opts.target_angle,
        "target": opts.move_request().map(|r| r.target),
        "goal_timeout_s": opts.goal_timeout_s,
        "slip_timeout_s": opts.slip_timeout_s,
        "moving_threshold": opts.moving_threshold,
        "outcome": report.outcome.map(|o| o.name()),
        "status": report.status.as_ref().map(status_json),
    })
}

/// Print `report` to stdout. Without `--json` and without a status there is
/// nothing to print.
pub fn print_report(opts: &Options, report: &RunReport, json: bool) {
    if json {
        println!("{}", report_json(opts, report));
    } else if let Some(status) = &report.status {
        println!("{status}");
    }
}
