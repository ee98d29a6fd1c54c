//! Logging initialization for the `shr` binary
//!
//! Logs go to stderr so expanded output on stdout stays machine readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logging(verbosity: u8) {
    tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn build_env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(verbosity).into())
}

fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "shr=info,shr_expand=info,warn",
        2 => "shr=debug,shr_expand=debug,warn",
        _ => "trace",
    }
}
