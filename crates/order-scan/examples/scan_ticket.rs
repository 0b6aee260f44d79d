//! Scan a ticket image against an order snapshot and write a JSON report.
//!
//! Usage: `scan_ticket <image.png> <orders.json> [report.json]`

use std::{env, fs, path::PathBuf};

use image::ImageReader;
use order_scan::engine::{
    FrameOutcome, InMemoryOrderStore, MatchResult, ScanSession, SessionConfig,
};
use order_scan::scan::scan_gray_image;
use serde::Serialize;

#[cfg(not(feature = "tracing"))]
use log::{info, warn, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::{info, warn};

#[cfg(feature = "tracing")]
use order_scan::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use order_scan::core::init_with_level;

#[derive(Debug, Serialize)]
struct ScanReport {
    image_path: String,
    orders_path: String,
    outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<MatchResult>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_with_level(LevelFilter::Info)?;

    #[cfg(feature = "tracing")]
    init_tracing(false);

    run()
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let image_path = args.next().unwrap_or_else(|| "ticket.png".to_owned());
    let orders_path = args.next().unwrap_or_else(|| "orders.json".to_owned());
    let report_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("scan_report.json"));

    let img = ImageReader::open(&image_path)?.decode()?.to_luma8();
    info!("loaded {image_path} ({}x{})", img.width(), img.height());

    let store = InMemoryOrderStore::load_json(&orders_path)?;
    info!("order snapshot holds {} keys", store.len());

    let mut session = ScanSession::new(SessionConfig::default(), store)?;
    let outcome = scan_gray_image(&mut session, &img)?;

    let (label, result) = match outcome {
        FrameOutcome::Matched(result) => {
            info!(
                "matched: {}",
                result
                    .order
                    .as_ref()
                    .map(|o| o.summary.as_str())
                    .unwrap_or("<no record>")
            );
            ("matched".to_owned(), Some(result))
        }
        FrameOutcome::NoSymbol => {
            warn!("no symbol found in frame");
            ("no_symbol".to_owned(), None)
        }
        FrameOutcome::TimedOut { budget } => {
            warn!("scan timed out (budget {budget:?})");
            ("timed_out".to_owned(), None)
        }
        FrameOutcome::Rejected { error } => {
            warn!("payload rejected: {error}");
            (format!("rejected: {error}"), None)
        }
    };

    let report = ScanReport {
        image_path,
        orders_path,
        outcome: label,
        result,
    };
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&report_path, json)?;
    println!("wrote report JSON to {}", report_path.display());
    Ok(())
}
