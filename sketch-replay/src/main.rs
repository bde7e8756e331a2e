//! # Sketch Canvas Replay
//!
//! Replays a recorded drawing script and writes the resulting image.

use clap::Parser;
use sketch_replay::{CliArgs, ReplayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("sketch_replay=info,sketch_renderer=info,sketch_core=info")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // RUST_LOG_FORMAT=json for machine-readable logs
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = ReplayConfig::from(args);

    tracing::info!(
        "Replaying {} onto {}x{} canvas",
        config.script.display(),
        config.width,
        config.height
    );

    let summary = sketch_replay::run(&config)?;

    println!("has_content: {}", summary.has_content);
    println!("strokes: {}", summary.stroke_count);
    println!(
        "snapshot: {}x{} {} bytes ({})",
        summary.width,
        summary.height,
        summary.bytes,
        summary.format.mime_type()
    );
    tracing::debug!("Summary: {}", serde_json::to_string(&summary)?);

    Ok(())
}
