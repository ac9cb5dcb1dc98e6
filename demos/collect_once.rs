// Time one full collection and print the snapshot as JSON.
//
// Usage: cargo run --example collect_once -- [CPU_SAMPLE_MS]
//   CPU_SAMPLE_MS  default: 100

use pcstats::collector::StatsCollector;
use pcstats::config::CollectorConfig;
use std::env;
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cpu_sample_interval_ms: u64 = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100);
    let config = CollectorConfig {
        cpu_sample_interval_ms,
        ..CollectorConfig::default()
    };
    let collector = StatsCollector::new(&config);

    let start = Instant::now();
    let snapshot = collector.collect().await;
    let elapsed = start.elapsed();

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!("Stats retrieval took: {:.2} ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}
