use std::env;
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives, e.g. `MLEND_LOG=microlend_core=debug`.
const FILTER_ENV: &str = "MLEND_LOG";
/// `json` for machine-readable logs; anything else is plain text.
const FORMAT_ENV: &str = "MLEND_LOG_FORMAT";

/// Install the global subscriber. Logs go to stderr so stdout stays pipeable.
pub fn init() {
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = env::var(FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    // A subscriber may already be set when embedded in tests.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
