//! apiprobe server binary.
//!
//! Reads its settings from `APIPROBE_*` environment variables (see
//! [`apiprobe::config`]) and serves until SIGTERM or Ctrl-C, then logs a
//! per-route request summary.

use std::process::ExitCode;

use apiprobe::config::Config;
use apiprobe::env::Env;
use apiprobe::middleware::RequestMetrics;
use apiprobe::{Capabilities, Error, Server, api, logging};

fn main() -> ExitCode {
    let config = match Config::from_env(&Env::real()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("apiprobe: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.log_format);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("apiprobe failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<(), Error> {
    // A bounded pool: enough concurrent POST /api/users can occupy every
    // worker, which is the behaviour this service exists to show.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        tracing::info!(
            workers = config.worker_threads,
            blocking_delay_ms = config.delays.blocking.as_millis() as u64,
            slow_delay_ms = config.delays.slow.as_millis() as u64,
            "starting apiprobe"
        );
        let metrics = RequestMetrics::new();
        let app = api::app_with_metrics(&Capabilities::system(), config.delays, &metrics);
        let served = Server::bind(config.listen).await?.serve(app).await;
        metrics.log_summary();
        served
    })
}
