//! Command-line interface for ccb-bench
//!
//! # Usage Examples
//!
//! ## Transport
//! ```bash
//! # HTTP: start the receiver first, then point the sender at it
//! ccb-bench receiver http 0.0.0.0 8080 --buffer-count 1000
//! ccb-bench sender http 10.0.0.2 8080 --buffer-count 1000
//!
//! # S3 + SQS
//! ccb-bench receiver sqs https://sqs.us-east-2.amazonaws.com/123456789012/ccb
//! ccb-bench sender sqs s3://ccb-bench/buffers/ https://sqs.us-east-2.amazonaws.com/123456789012/ccb
//! ```
//!
//! ## Services
//! ```bash
//! # Index put/delete workload: THREAD_NUM BATCH_NUM BATCH_SIZE TABLE_ID INDEX_ID
//! ccb-bench index 16 100 1000 1 1
//!
//! # Transaction begin/commit workload
//! ccb-bench trans --workers 128 --iterations 100 --batch-size 100
//! ```
//!
//! Set `RUST_LOG=info` to see progress logs on stderr; results go to stdout.

use bench_transport::{ReceiverTransport, SenderTransport};
use ccb_bench::{bench, IndexArgs, ProbeOpts, TransArgs, LOCAL_INDEX_NOTE, LOCAL_TRANS_NOTE};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ccb-bench")]
#[command(about = "Throughput benchmarks for data transports, index services and transaction services")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push buffers to a receiver and report the send rate
    Sender {
        #[command(subcommand)]
        transport: SenderCommand,
    },

    /// Drain buffers from a sender and report the receive rate
    Receiver {
        #[command(subcommand)]
        transport: ReceiverCommand,
    },

    #[command(about = LOCAL_INDEX_NOTE)]
    Index {
        #[command(flatten)]
        args: IndexArgs,
    },

    #[command(about = LOCAL_TRANS_NOTE)]
    Trans {
        #[command(flatten)]
        args: TransArgs,
    },
}

#[derive(Subcommand)]
enum SenderCommand {
    /// POST buffers to an HTTP receiver
    Http {
        /// Receiver host
        host: String,

        /// Receiver port
        port: u16,

        #[command(flatten)]
        opts: ProbeOpts,
    },

    /// Store buffers in S3 and announce them on an SQS queue
    Sqs {
        /// Object prefix, e.g. s3://bucket/path/
        s3_prefix: String,

        /// SQS queue URL
        queue_url: String,

        #[command(flatten)]
        opts: ProbeOpts,
    },
}

impl SenderCommand {
    fn into_parts(self) -> (SenderTransport, ProbeOpts) {
        match self {
            SenderCommand::Http { host, port, opts } => (SenderTransport::Http { host, port }, opts),
            SenderCommand::Sqs {
                s3_prefix,
                queue_url,
                opts,
            } => (
                SenderTransport::Sqs {
                    s3_prefix,
                    queue_url,
                },
                opts,
            ),
        }
    }
}

#[derive(Subcommand)]
enum ReceiverCommand {
    /// Serve an HTTP endpoint senders POST buffers to
    Http {
        /// Address to listen on
        host: String,

        /// Port to listen on
        port: u16,

        #[command(flatten)]
        opts: ProbeOpts,
    },

    /// Long-poll an SQS queue for buffers stored in S3
    Sqs {
        /// SQS queue URL
        queue_url: String,

        #[command(flatten)]
        opts: ProbeOpts,
    },
}

impl ReceiverCommand {
    fn into_parts(self) -> (ReceiverTransport, ProbeOpts) {
        match self {
            ReceiverCommand::Http { host, port, opts } => {
                (ReceiverTransport::Http { host, port }, opts)
            }
            ReceiverCommand::Sqs { queue_url, opts } => {
                (ReceiverTransport::Sqs { queue_url }, opts)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sender { transport } => {
            let (transport, opts) = transport.into_parts();
            let report = bench::run_sender(transport, &opts).await?;
            println!("{}", report.summary());
        }
        Commands::Receiver { transport } => {
            let (transport, opts) = transport.into_parts();
            let report = bench::run_receiver(transport, &opts).await?;
            println!("{}", report.summary());
        }
        Commands::Index { args } => {
            let report = bench::run_index(args.to_config()?).await?;
            print!("{}", report.summary());
        }
        Commands::Trans { args } => {
            let report = bench::run_trans(args.to_config()?).await?;
            print!("{}", report.summary());
        }
    }

    Ok(())
}
