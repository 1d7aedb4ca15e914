#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::config::{CliArgs, OutputMode, RunConfig};
use cli::drain::{Drained, collect, drain};
use cli::telemetry::init_telemetry;
use std::io::{self, Write};
use tokio::{signal, task::JoinSet};
use wordmill::{Error, Schedule, WordProducer};

// Using mimalloc for its throughput with many short-lived word allocations
// across producer threads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Schedule dump printed by `--plan`.
#[derive(serde::Serialize)]
struct Plan<'a> {
    queues: usize,
    threads_per_queue: usize,
    queue_capacity: usize,
    words: String,
    workers: &'a Schedule,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let producer = WordProducer::new(config.producer)?;
    match config.mode {
        OutputMode::Plan => print_plan(&producer),
        mode => run(producer, mode).await,
    }
}

fn log_startup_info(_config: &RunConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting wordmill with full config: {:#?}", _config);
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Starting wordmill with {} queues x {} threads over {} lengths",
            _config.producer.number_of_queues(),
            _config.producer.threads_per_queue(),
            _config.producer.table().len(),
        );
    }
}

fn print_plan(producer: &WordProducer) -> anyhow::Result<()> {
    let config = producer.config();
    let plan = Plan {
        queues: config.number_of_queues(),
        threads_per_queue: config.threads_per_queue(),
        queue_capacity: config.queue_capacity(),
        words: producer.coverage().words.to_string(),
        workers: producer.schedule(),
    };

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &plan)?;
    writeln!(out)?;
    Ok(())
}

/// Starts production, drains every queue on a blocking task and waits for
/// the workers, racing the whole run against shutdown signals.
async fn run(producer: WordProducer, mode: OutputMode) -> anyhow::Result<()> {
    let mut production = producer.produce()?;
    let cancel = production.cancel_token();

    let mut drains = JoinSet::new();
    for queue in production.take_queues() {
        let cancel = cancel.clone();
        drains.spawn_blocking(move || drain(queue, mode, &cancel, || io::stdout().lock()));
    }

    let mut drained = Drained::default();
    let interrupted = tokio::select! {
        res = collect(&mut drains, &mut drained) => {
            res?;
            false
        }
        () = shutdown_signal() => true,
    };
    if interrupted {
        cancel.cancel();
        collect(&mut drains, &mut drained).await?;
    }

    let result = tokio::task::spawn_blocking(move || production.wait()).await?;

    if let Some(e) = drained.error {
        if e.kind() == io::ErrorKind::BrokenPipe {
            #[cfg(feature = "tracing")]
            tracing::debug!(words = drained.words, "Stdout closed, production stopped");
            return Ok(());
        }
        return Err(e.into());
    }
    if interrupted {
        #[cfg(feature = "tracing")]
        tracing::warn!(words = drained.words, "Production interrupted");
        return Err(Error::Cancelled.into());
    }

    let report = result?;
    #[cfg(feature = "tracing")]
    tracing::info!(words = report.words(), "All words produced");

    if mode == OutputMode::CountOnly {
        writeln!(io::stdout().lock(), "{}", report.words())?;
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }
}
