use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dierig_core::RollStats;

mod session;
mod sim;

use session::{Session, SessionConfig};
use sim::{simulated_rig, JsonlSink};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SessionConfig {
        die_id: 1,
        max_samples: 10,
        ..SessionConfig::default()
    };

    if let Ok(json) = serde_json::to_string(&config) {
        info!(config = %json, "session configuration");
    }

    let (motor, camera, detector) = simulated_rig(0x5117);
    let out_path = "rolls.jsonl";
    let sink = JsonlSink::new(BufWriter::new(
        File::create(out_path).with_context(|| format!("Failed to create {}", out_path))?,
    ));

    let mut session = Session::new(config, camera, detector, motor, sink)?;

    let cancel = AtomicBool::new(false);
    let stats = session.run(&cancel)?;

    print_stats(&stats);
    info!(overruns = session.pacing_overruns(), out_path, "done");
    Ok(())
}

fn print_stats(stats: &RollStats) {
    println!("Roll history of {}:", stats.total);
    for face in 1..=6u32 {
        println!("  {}: {:.0}%", face, stats.face_percentage(face));
    }
    println!("  Invalid (>6): {:.0}%", stats.invalid_percentage());
}
