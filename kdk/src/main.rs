// External crates
use clap::Parser;
use tracing::{debug, info_span};
use uuid::Uuid;

// Internal imports
use kdk_core::kdk_error;
use kdk_messages::{msg, MESSAGES};

// Local modules
mod cli;
mod commands;
mod error;
mod keypair;
mod ssh;
mod update;

use cli::Args;
use commands::execute_command;

/// Set to keep stdout free of log output, e.g. under integration tests.
const TEST_MODE_ENV: &str = "KDK_TEST_MODE";

fn main() {
    let args = Args::parse();

    let log_guard = if std::env::var_os(TEST_MODE_ENV).is_none() {
        kdk_logging::init_subscriber(args.debug)
    } else {
        None
    };

    // Every event of this invocation carries the request id and command name.
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("request", request_id = %request_id, command = args.command.name());
    let result = span.in_scope(|| {
        debug!("Starting kdk command");
        execute_command(args)
    });

    if let Err(e) = result {
        kdk_error!("{}", msg!(MESSAGES.common.error_generic, error = &e));
        drop(log_guard);
        std::process::exit(1);
    }
}
