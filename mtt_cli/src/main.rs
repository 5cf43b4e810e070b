#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `mtt`: command one servo to an angle and report its status.

mod backend;
mod cli;
mod error_fmt;
mod logging;
mod options;
mod output;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use mtt_core::{LinkGuard, MttError};
use mtt_traits::MonotonicClock;

use crate::cli::{ACTIVE_ID, Cli, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::options::{Options, load_config};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let mut file_guard = None;
    let result = load_config(&cli).and_then(|cfg| {
        let log_cfg = cfg.logging.clone();
        let opts = Options::resolve(&cli, cfg)?;
        file_guard = logging::init(cli.json, cli.log_level.as_deref(), &log_cfg)?;
        run(&cli, &opts)
    });
    let code = match result {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&err));
            } else {
                eprintln!("{}", humanize(&err));
            }
            exit_code_for_error(&err)
        }
    };
    // flush the file sink; process::exit skips destructors
    drop(file_guard);
    std::process::exit(code);
}

fn run(cli: &Cli, opts: &Options) -> eyre::Result<()> {
    let _ = ACTIVE_ID.set(opts.motor_id);
    tracing::debug!(?opts, "options resolved");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler; moves cannot be cancelled");
        }
    }

    let mut link = LinkGuard::new(backend::open(opts)?);
    let cancel: &dyn Fn() -> bool = &|| shutdown.load(Ordering::Relaxed);
    let result = mtt_core::run(
        &mut *link,
        MonotonicClock::new(),
        &opts.registers,
        &opts.plan(),
        Some(cancel),
    );
    if let Err(e) = link.close() {
        tracing::warn!(error = %e, "link close failed");
    }
    let report = result?;

    output::print_report(opts, &report, cli.json);
    if let Some(outcome) = report.incomplete() {
        return Err(MttError::MoveIncomplete(outcome).into());
    }
    Ok(())
}
