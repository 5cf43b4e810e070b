//! Human-readable error descriptions and structured JSON error formatting.

use mtt_core::{MttError, PollOutcome};

use crate::cli::ACTIVE_ID;

fn id_prefix() -> String {
    ACTIVE_ID.get().map_or_else(String::new, |id| format!("ID:{id} "))
}

/// Map an eyre::Report to a diagnostic with likely causes and fix hints.
///
/// The first line keeps the bench tool's `ID:<id> TE:<code>:<text>` and
/// `ID:<id> RE:<code>:<text>` shape for scripts that grep for it.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(e) = err.downcast_ref::<MttError>() {
        let id = id_prefix();
        return match e {
            MttError::Comm { op, code, message } => format!(
                "{id}TE:{code}:{message}\nWhat happened: {op} failed on the bus.\nLikely causes: Wrong motor ID or baud rate, unpowered servo, or loose cabling.\nHow to fix: Check -i/-b against the servo settings and the bus wiring."
            ),
            MttError::Device { op, code, message } => format!(
                "{id}RE:{code}:{message}\nWhat happened: The servo flagged an error during {op}.\nLikely causes: Overload, overheating, or a goal outside the configured angle limits.\nHow to fix: Remove the load, let the servo cool, then power-cycle it."
            ),
            MttError::LinkOpen(msg) => format!(
                "What happened: Could not open the serial link ({msg}).\nLikely causes: Wrong port name, missing permissions, or unsupported baud rate.\nHow to fix: Check -n and -b; ensure the user may access the device."
            ),
            MttError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or the environment.\nHow to fix: Edit the config file, then rerun. Try -h for the accepted ranges."
            ),
            MttError::MoveIncomplete(outcome) => match outcome {
                PollOutcome::Slipped => format!(
                    "{id}SL:motor slipped\nWhat happened: The position stopped changing before the goal was reached.\nLikely causes: Mechanical obstruction or torque limit too low.\nHow to fix: Clear the obstruction or raise the limit with -l."
                ),
                PollOutcome::GoalTimedOut => format!(
                    "{id}GT:goal timeout expired\nWhat happened: The servo was still short of the goal when the goal timeout ran out.\nLikely causes: Slow servo or a long move.\nHow to fix: Raise the goal timeout with -t."
                ),
                PollOutcome::Cancelled => format!("{id}CA:move cancelled"),
                PollOutcome::Reached => format!("{id}{e}"),
            },
        };
    }

    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 1 link/bus/other, 2 configuration, 3 slipped,
/// 4 goal timeout, 5 cancelled.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<MttError>() {
        Some(MttError::Config(_)) => 2,
        Some(MttError::MoveIncomplete(PollOutcome::Slipped)) => 3,
        Some(MttError::MoveIncomplete(PollOutcome::GoalTimedOut)) => 4,
        Some(MttError::MoveIncomplete(PollOutcome::Cancelled)) => 5,
        _ => 1,
    }
}

fn reason_name(e: &MttError) -> &'static str {
    match e {
        MttError::Config(_) => "Config",
        MttError::LinkOpen(_) => "LinkOpen",
        MttError::Comm { .. } => "Comm",
        MttError::Device { .. } => "Device",
        MttError::MoveIncomplete(o) => o.name(),
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(e) = err.downcast_ref::<MttError>() {
        let mut obj = json!({
            "reason": reason_name(e),
            "message": e.to_string(),
            "id": ACTIVE_ID.get(),
        });
        match e {
            MttError::Comm { op, code, .. } => {
                obj["op"] = json!(op.to_string());
                obj["code"] = json!(code);
            }
            MttError::Device { op, code, .. } => {
                obj["op"] = json!(op.to_string());
                obj["code"] = json!(code);
            }
            _ => {}
        }
        return obj.to_string();
    }

    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}
