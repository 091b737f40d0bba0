//! Application entry point: call-flow webhook handler over stdin/stdout.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`LogLevel`, overridable by `RUST_LOG`).
//! 2. Load [`AppConfig`] from disk and apply environment overrides.
//! 3. Create the [`tokio`] runtime.
//! 4. Build the HTTP capability adapters and the scenario's flow.
//! 5. Serve NDJSON invocations from stdin until it closes.

use std::sync::Arc;

use anyhow::{Context, Result};
use call_flows::{
    capability::LogFailureSink,
    config::AppConfig,
    flow::FlowContext,
    transport::serve_ndjson,
    CallHandler,
};

/// Environment variable selecting the default log level.
const ENV_LOG_LEVEL: &str = "LogLevel";

/// Map `LogLevel` to an env_logger filter; only `INFO` and `DEBUG` are
/// honoured.
fn default_log_filter(level: Option<&str>) -> &'static str {
    match level.map(str::trim) {
        Some(l) if l.eq_ignore_ascii_case("DEBUG") => "debug",
        _ => "info",
    }
}

fn main() -> Result<()> {
    // 1. Logging
    let level = std::env::var(ENV_LOG_LEVEL).ok();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(level.as_deref())),
    )
    .init();
    log::info!("call-flows starting up");

    // 2. Configuration
    let config = AppConfig::load()
        .unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        })
        .with_env_overrides();
    log::info!(
        "scenario={} bucket={}",
        config.scenario,
        config.storage.bucket.as_deref().unwrap_or("<default>")
    );

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Adapters and flow
    let scenario = config.scenario;
    let ctx = FlowContext::from_config(Arc::new(config), Arc::new(LogFailureSink));
    let handler = CallHandler::for_scenario(scenario, ctx);

    // 5. Serve
    let report = rt.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        serve_ndjson(&handler, stdin, &mut stdout).await
    })?;

    log::info!(
        "call-flows exiting: {} invocation(s), {} unparseable",
        report.processed_lines,
        report.parse_errors
    );
    Ok(())
}
