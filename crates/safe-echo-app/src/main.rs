#![warn(missing_docs)]
//! # safe-echo-app binary
//!
//! CLI entry point: with no arguments prints runtime status; with arguments
//! classifies the joined text as one message from an unknown sender.

use std::sync::Arc;

use safe_echo_app::{
    RunLogger, alert_db_path_from_env, app_version, build_engine_from_env,
    model_path_from_env, monitor_enabled_from_env,
};
use safe_echo_core::CallerContext;

/// CLI entry point.
fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        println!("safe-echo {}", app_version());
        println!(
            "monitor_enabled={} (SAFE_ECHO_MONITOR_ENABLED)",
            monitor_enabled_from_env()
        );
        println!("alert_db={}", alert_db_path_from_env().display());
        println!("model_path={}", model_path_from_env().display());
        return;
    }

    let logger = Arc::new(RunLogger::to_writer(Box::new(std::io::stderr())));
    let engine = match build_engine_from_env(logger) {
        Ok(engine) => engine,
        Err(error) => {
            eprintln!("failed to start safe-echo: {error}");
            std::process::exit(1);
        }
    };

    let text = args.join(" ");
    let outcome = engine.classify(&text, CallerContext::unknown_sender());

    match serde_json::to_string_pretty(&outcome.verdict) {
        Ok(rendered) => println!("{rendered}"),
        Err(error) => {
            eprintln!("failed to render verdict: {error}");
            std::process::exit(1);
        }
    }
}
