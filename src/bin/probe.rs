//! Fetch the listing page once and print what the watcher would see.
//!
//! Sends nothing and leaves the state file untouched. Uses the same
//! `UNITWATCH_*` environment as the main binary.

use unitwatch::data::Aggregator;
use unitwatch::scrape::{extract_units, HttpPageSource, PageSource};
use unitwatch::WatchConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = WatchConfig::from_env()?;
    let source = HttpPageSource::new(&config.url, &config.user_agent, config.fetch_timeout)?;

    let started = std::time::Instant::now();
    let html = source.fetch().await?;
    let fetch_ms = started.elapsed().as_millis();

    let records = extract_units(&html)?;
    let total = records.len();
    let snapshot = Aggregator::new(config.monitored_types.iter().cloned()).aggregate(records);

    println!("Fetched {} ({} bytes) in {} ms", source.url(), html.len(), fetch_ms);
    println!("Unit anchors: {}", total);
    println!("Monitored types: {:?}", config.monitored_types);
    println!("Monitored units: {}", snapshot.monitored());
    println!(
        "  free: {}  reserved: {}  rented: {}  unknown: {}",
        snapshot.counts.free,
        snapshot.counts.reserved,
        snapshot.counts.rented,
        snapshot.counts.unknown
    );

    for unit in &snapshot.units {
        println!(
            "  {:<24} {:<10} {:<9} {}",
            unit.unit_type,
            unit.identifier,
            unit.status,
            unit.link.as_deref().unwrap_or("-")
        );
    }

    println!("Free list signature: {}", snapshot.free.signature().as_str());
    Ok(())
}
