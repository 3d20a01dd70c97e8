//! Diagnostic logging setup.
//!
//! Diagnostics are off unless `RUST_LOG` asks for them. They are written to
//! stderr, which shares the terminal with the chat screen, so redirect it
//! when enabling them (`RUST_LOG=quillchat=debug quillchat 2>quillchat.log`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "off";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Calling it again is a no-op.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();
}
