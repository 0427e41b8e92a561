// src/bin/demo.rs
//
// Stand-alone probe for the pipeline: drive the core without any GUI
// attached and print what it publishes.

use handscene_core::{Config, CoreEvent, EventSink, Orchestrator, SimulatedSource};
use tracing::info;

struct LoggingSink;

impl EventSink for LoggingSink {
    fn publish(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::ModeChanged(mode) => info!(?mode, "mode changed"),
            CoreEvent::GrabEdge(rising) => info!(rising, "grab edge"),
            CoreEvent::SelectionChanged(sel) => info!(?sel, "selection changed"),
            CoreEvent::PointerUpdated { x, y, z, visible } => {
                if visible {
                    info!(x, y, z, "pointer updated");
                }
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::default();
    let source = SimulatedSource::new(33.0);
    let mut orchestrator = Orchestrator::new(source, &config)?;
    let mut sink = LoggingSink;

    info!("starting simulated pipeline, 10 seconds at 60 Hz render / ~30 Hz detector");

    let mut timestamp_ms = 0.0;
    let render_dt_ms = 1000.0 / 60.0;
    for _ in 0..600 {
        orchestrator.tick_detector(timestamp_ms, render_dt_ms, &mut sink)?;
        orchestrator.tick_render(render_dt_ms / 1000.0, 60.0, &mut sink);
        timestamp_ms += render_dt_ms;
    }

    info!(mode = ?orchestrator.mode(), "final mode");
    Ok(())
}
