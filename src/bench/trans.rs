use bench_trans::{LocalTransService, TransBenchConfig, TransBenchmark, TransReport, TransService};
use std::sync::Arc;
use tracing::info;

/// Run the begin/commit workload against an in-process transaction service.
pub async fn run_trans(config: TransBenchConfig) -> anyhow::Result<TransReport> {
    info!("Running transaction benchmark against the in-process transaction service");
    run_trans_with(Arc::new(LocalTransService::new()), config).await
}

pub async fn run_trans_with(
    service: Arc<dyn TransService>,
    config: TransBenchConfig,
) -> anyhow::Result<TransReport> {
    let benchmark = TransBenchmark::new(service, config)?;
    Ok(benchmark.run().await?)
}
