//! SentinelAC Core - Main Entry Point

mod logic;
pub mod constants;

use std::sync::Arc;

use logic::config::ScanConfig;
use logic::detectors::{
    BehaviorDetector, InputToolDetector, MemoryScanDetector, ProcessDetector, StatisticalDetector,
};
use logic::engine::ScanEngine;
use logic::signatures::{SignatureDatabase, Whitelist};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "Starting {} v{} host integrity scan...",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let config = ScanConfig::default().with_admin(std::env::args().any(|a| a == "--admin"));
    let signatures = Arc::new(SignatureDatabase::load(&config.signatures_path));
    let whitelist = Arc::new(Whitelist::load(&config.whitelist_path));

    let mut engine = ScanEngine::new(config);
    engine.register(Arc::new(ProcessDetector::new(
        Arc::clone(&signatures),
        Arc::clone(&whitelist),
    )));
    engine.register(Arc::new(InputToolDetector::new(Arc::clone(&whitelist))));
    engine.register(Arc::new(StatisticalDetector::new()));

    let behavior = Arc::new(BehaviorDetector::new());
    #[cfg(windows)]
    {
        // Feed the timing analyzer while the scan runs
        let mut poller = logic::detectors::behavior::poller::KeyPoller::new(behavior.recorder());
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(std::time::Duration::from_millis(10));
            loop {
                tick.tick().await;
                poller.poll();
            }
        });
    }
    engine.register(behavior);

    engine.register(Arc::new(MemoryScanDetector::new(Arc::clone(&whitelist))));

    let report = engine.execute_full_scan().await;

    log::info!(
        "Scan {}: {} findings, overall level {}, clean = {}",
        report.scan_id,
        report.total_checks(),
        report.overall_level(),
        report.is_clean()
    );
    for threat in report.high_confidence_threats() {
        log::warn!(
            "[{}] {} - {} (confidence {:.2})",
            threat.level,
            threat.description,
            threat.details,
            threat.confidence
        );
    }
    for fp in report.possible_false_positives() {
        log::info!(
            "Possible false positive: {} - {} (confidence {:.2})",
            fp.description,
            fp.details,
            fp.confidence
        );
    }

    // JSON export for external consumers
    if std::env::args().any(|a| a == "--json") {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Report serialization failed: {}", e),
        }
    }
}
