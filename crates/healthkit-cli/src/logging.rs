use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a verbosity count: warnings, then `-v` info, `-vv` debug, `-vvv` trace
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "healthkit_cli=warn",
        1 => "healthkit_cli=info",
        2 => "healthkit_cli=debug",
        _ => "healthkit_cli=trace",
    }
}

/// Initialize stderr logging; `RUST_LOG` overrides the verbosity flag
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let console_layer = fmt::layer()
        .with_target(verbosity > 1)
        .with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already set, keeping it");
    }
}
