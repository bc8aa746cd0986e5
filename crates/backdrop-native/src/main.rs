//! Headless driver: runs the backdrop at a fixed 60 Hz step and logs a
//! population summary once per simulated second.
//!
//! Usage: `backdrop-native [mode] [seconds]`

use std::time::{Duration, Instant};

use anyhow::Context;
use backdrop_core::{Background, BlobInstance, BlobMesh, Renderer, SceneSetup};

const STEP: Duration = Duration::from_nanos(16_666_667);

/// Accumulates what a GPU renderer would have drawn.
#[derive(Default)]
struct StatsRenderer {
    submitted: usize,
    visible: usize,
    vertices: usize,
    opacity_sum: f32,
}

impl Renderer for StatsRenderer {
    fn begin_frame(&mut self, _setup: &SceneSetup) {
        self.submitted = 0;
        self.visible = 0;
        self.vertices = 0;
        self.opacity_sum = 0.0;
    }

    fn submit(&mut self, _slot: usize, instance: &BlobInstance, mesh: &BlobMesh) {
        self.submitted += 1;
        if instance.is_visible() {
            self.visible += 1;
            self.vertices += mesh.positions.len();
            self.opacity_sum += instance.opacity;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "standard".to_string());
    let seconds: u64 = match args.next() {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid duration `{s}`"))?,
        None => 30,
    };

    let mut background = Background::new(&mode, 1920, 1080, 0x1a7a)
        .with_context(|| format!("cannot start backdrop in mode `{mode}`"))?;
    background.on_first_frame_rendered(|| log::info!("first frame rendered"));
    log::info!(
        "running mode={} for {}s ({} blobs)",
        background.mode(),
        seconds,
        background.population().len()
    );

    let mut renderer = StatsRenderer::default();
    let frames_per_sec = 60;
    let started = Instant::now();
    for frame in 1..=seconds * frames_per_sec {
        let stats = background.frame(STEP, &mut renderer);
        if let Some(sweep) = stats.sweep.filter(|s| !s.is_empty()) {
            log::debug!(
                "sweep faded={} reset={} added={}",
                sweep.faded,
                sweep.reset,
                sweep.added
            );
        }
        if frame % frames_per_sec == 0 {
            let pop = background.population();
            let mean_opacity = if renderer.visible > 0 {
                renderer.opacity_sum / renderer.visible as f32
            } else {
                0.0
            };
            log::info!(
                "t={:>3}s blobs={} active={} visible={} verts={} mean_opacity={:.2} pending={}",
                frame / frames_per_sec,
                pop.len(),
                pop.active_count(),
                pop.visible_count(),
                renderer.vertices,
                mean_opacity,
                pop.pending_events()
            );
        }
    }

    log::info!(
        "{} frames simulated in {:.2?} ({} submitted last frame)",
        background.frame_count(),
        started.elapsed(),
        renderer.submitted
    );
    Ok(())
}
