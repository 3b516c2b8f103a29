use std::env;
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber.
///
/// `LPFORMAT_LOG` holds an `EnvFilter` directive (default `off`, `--verbose`
/// raises it to `debug`). `LPFORMAT_LOG_FORMAT` is `pretty` (default) or `json`.
pub fn init(verbose: bool) -> Result<(), String> {
    let level = env::var("LPFORMAT_LOG").ok().unwrap_or_else(|| {
        if verbose { "debug" } else { "off" }.to_string()
    });

    let filter = if level.eq_ignore_ascii_case("off") {
        EnvFilter::default().add_directive(LevelFilter::OFF.into())
    } else {
        EnvFilter::try_new(&level).map_err(|err| format!("Invalid log filter: {err}"))?
    };

    let format = env::var("LPFORMAT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    let result = if format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).json())
            .try_init()
    } else if format.eq_ignore_ascii_case("pretty") {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).pretty())
            .try_init()
    } else {
        return Err("Invalid LPFORMAT_LOG_FORMAT (expected 'json' or 'pretty')".to_string());
    };
    result.map_err(|err| format!("Failed to initialize logging: {err}"))
}
