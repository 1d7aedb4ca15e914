//! Log output for the `wordmill` binary.
//!
//! Logs go to stderr so that stdout carries nothing but words. The filter is
//! read from `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=wordmill=debug wordmill --alphabet 1..=4=a,b,c > words.txt
//! ```
//!
//! Library events are only emitted with the `tracing` feature, which is on by
//! default.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;
    Ok(())
}
