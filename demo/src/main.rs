//! Drives the mock shop workload with an in-process database, for trying out
//! profiles and modes without a real server.
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use mock_app::{MockApp, MockConnector, MockDatabase, ROW_BYTES};
use std::net::SocketAddr;
use tidal::prelude::*;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(version, about)]
struct DemoArgs {
    #[command(flatten)]
    tidal: TidalArgs,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,

    /// Rows the mock database starts with.
    #[arg(long, default_value_t = 100_000)]
    initial_rows: u64,

    /// Fraction of queries that fail.
    #[arg(long, default_value_t = 0.0)]
    error_rate: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tidal=info,mock_app=warn")),
        )
        .init();

    let args = DemoArgs::parse();

    if let Some(addr) = args.metrics_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Serving metrics on {addr}");
    }

    let db = MockDatabase::with_rows(args.initial_rows);
    let app = MockApp::shop().with_error_rate(args.error_rate);
    let executor = Executor::new(
        args.tidal.into(),
        MockConnector::new(db.clone()),
        Workload::with_size_maintenance(app),
    )?;

    let summary = run_until_signal(&executor).await?;
    println!("{summary}");
    println!(
        "mock database: {} rows ({} bytes of {} per row)",
        db.rows(),
        db.size_bytes(),
        ROW_BYTES
    );

    Ok(())
}
