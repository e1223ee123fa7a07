use anyhow::Result;
use popcorn_config::LoggingConfig;
use std::io;
use std::io::IsTerminal;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Build the filter: -q wins, then -v/-vv, then RUST_LOG, then the configured level.
fn build_filter(verbose_level: u8, quiet: bool, configured_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose_level {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured_level)),
        // -v: debug but keep hyper's connection chatter out
        1 => EnvFilter::new("debug,hyper::proto::h1=warn,hyper::client::pool=warn"),
        _ => EnvFilter::new("trace"),
    }
}

fn use_json(config: &LoggingConfig) -> bool {
    std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .ok()
        .or(config.json)
        .unwrap_or_else(|| !io::stdout().is_terminal())
}

pub fn init_logging(verbose_level: u8, quiet: bool, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(verbose_level, quiet, &config.level);
    let json = use_json(config);
    let registry = Registry::default().with(filter);

    // With a log file configured, write there; otherwise stderr keeps stdout for results
    if let Some(log_path) = &config.file {
        let log_dir = log_path.parent()
            .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
        std::fs::create_dir_all(log_dir)?;

        let log_filename = log_path.file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

        // "popcorn.log" rotates as popcorn.2026-10-19 and so on
        let log_prefix = log_filename
            .rsplitn(2, '.')
            .nth(1)
            .unwrap_or(log_filename);

        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);

            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);

            registry.with(fmt_layer).init();
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(fmt_layer).init();
    }

    Ok(())
}
