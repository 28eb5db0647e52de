//! Quill kernel entry point.
//!
//! Wires the broker, dispatcher, and channel queues together and starts the
//! Tokio async runtime. Socket creation stays with the host embedding this
//! kernel; the binary exposes the channel queues that a socket pump drains
//! and feeds.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ ConnectionInfo::load()   -- connection file, signing key, ports
//!  └─ Signer / Session         -- fail-fast scheme validation
//!  └─ MessageBroker
//!  └─ ShellDispatcher::start() -- builds actions, announces `starting`
//!       ├─ dispatch loop        (Tokio task, fed by the shell queue)
//!       └─ outbound pumps       (Tokio tasks draining shell/iopub queues)
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use quill_kernel::application::broker::MessageBroker;
use quill_kernel::application::dispatch::ShellDispatcher;
use quill_kernel::application::engine::EchoInterpreter;
use quill_kernel::infrastructure::connection::ConnectionInfo;
use quill_kernel::infrastructure::transport::MpscChannel;
use quill_wire::Session;

/// Jupyter kernel backend speaking the wire protocol over host-provided
/// channels.
#[derive(Debug, Parser)]
#[command(name = "quill-kernel", version)]
struct Cli {
    /// Path to the Jupyter connection file written by the front-end.
    #[arg(long, env = "QUILL_CONNECTION_FILE")]
    connection_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Quill kernel starting");

    let connection = ConnectionInfo::load(&cli.connection_file)
        .with_context(|| format!("loading connection file {:?}", cli.connection_file))?;
    info!(
        shell = %connection.endpoint(connection.shell_port),
        iopub = %connection.endpoint(connection.iopub_port),
        scheme = %connection.signature_scheme,
        "connection file loaded"
    );

    // Scheme validation happens here, before any message is handled.
    let signer = connection
        .signer()
        .context("validating signature scheme")?;
    if signer.is_unsigned() {
        info!("empty key: running in unsigned mode");
    }

    let session = Session::new();
    info!(session = %session.id(), "session created");

    let broker = Arc::new(MessageBroker::new(signer.clone(), session));

    // Channel queues. The host socket pump owns the receiving halves; for
    // the headless binary they are drained by logging pumps below.
    let (shell_channel, mut shell_out) = MpscChannel::new("shell");
    let (iopub_channel, mut iopub_out) = MpscChannel::new("iopub");
    let (inbound_tx, inbound_rx) = tokio::sync::mpsc::unbounded_channel::<Vec<Vec<u8>>>();

    // Shutdown flag shared between the dispatcher and the signal handler.
    let running = Arc::new(AtomicBool::new(true));

    let dispatcher = ShellDispatcher::start(
        Arc::clone(&broker),
        Arc::new(shell_channel),
        Arc::new(iopub_channel),
        Arc::new(EchoInterpreter),
        signer,
        Arc::clone(&running),
    )
    .await
    .context("starting shell dispatcher")?;

    // ── Outbound pumps ────────────────────────────────────────────────────────
    tokio::spawn(async move {
        while let Some(frames) = shell_out.recv().await {
            debug!(frames = frames.len(), "shell frames ready for transport");
        }
    });
    tokio::spawn(async move {
        while let Some(frames) = iopub_out.recv().await {
            debug!(frames = frames.len(), "iopub frames ready for transport");
        }
    });

    // ── Dispatch loop ─────────────────────────────────────────────────────────
    let dispatch_task = tokio::spawn(async move {
        dispatcher.run(inbound_rx).await;
    });
    // Keep the inbound queue open for the lifetime of the process; the host
    // socket pump would clone this sender per shell socket.
    let _inbound_tx = inbound_tx;

    // ── Ctrl-C / SIGTERM handler ──────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("Quill kernel ready.  Press Ctrl-C to exit.");

    loop {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
    }

    dispatch_task.abort();
    info!("Quill kernel stopped");
    Ok(())
}
