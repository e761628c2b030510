use bench_framework::BenchReport;
use bench_index::{IndexBenchConfig, IndexBenchmark, IndexService, LocalIndexService};
use std::sync::Arc;
use tracing::info;

/// Run the put and delete phases against an in-process index service.
pub async fn run_index(config: IndexBenchConfig) -> anyhow::Result<BenchReport> {
    info!("Running index benchmark against the in-process index service");
    run_index_with(Arc::new(LocalIndexService::new()), config).await
}

/// Run the put and delete phases against `service`.
pub async fn run_index_with(
    service: Arc<dyn IndexService>,
    config: IndexBenchConfig,
) -> anyhow::Result<BenchReport> {
    let benchmark = IndexBenchmark::new(service, config)?;
    Ok(benchmark.run().await?)
}
