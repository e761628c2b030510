use crate::ProbeOpts;
use anyhow::Context;
use bench_transport::{ProbeReport, ReceiverTransport, SenderTransport};
use tracing::info;

/// Open a sender over `transport` and push the configured buffers through it.
pub async fn run_sender(transport: SenderTransport, opts: &ProbeOpts) -> anyhow::Result<ProbeReport> {
    let probe = opts.probe()?;
    let name = transport.name();
    info!("Opening {} sender", name);

    let mut sender = transport
        .connect()
        .await
        .with_context(|| format!("Failed to open {name} sender"))?;
    probe
        .run_sender(sender.as_mut())
        .await
        .with_context(|| format!("{name} sender failed"))
}

/// Open a receiver over `transport` and drain the configured buffers from it.
pub async fn run_receiver(
    transport: ReceiverTransport,
    opts: &ProbeOpts,
) -> anyhow::Result<ProbeReport> {
    let probe = opts.probe()?;
    let name = transport.name();
    info!("Opening {} receiver", name);

    let mut receiver = transport
        .connect()
        .await
        .with_context(|| format!("Failed to open {name} receiver"))?;
    probe
        .run_receiver(receiver.as_mut())
        .await
        .with_context(|| format!("{name} receiver failed"))
}
