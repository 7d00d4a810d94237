use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Sender};
use renderer::GpuAdapter;
use scheduler::{
    CardScheduler, ContextSignal, PoolStats, PumpReport, SurfaceId, SurfaceSize, Viewport,
};
use shaderlib::{CardIdentity, ShaderLibrary};
use tracing_subscriber::EnvFilter;

use crate::backend::{gpu_power, GpuFactory, LossRelay};
use crate::cards::{load_cards, synthesise_cards};
use crate::cli::RunArgs;
use crate::config::{load_config, pack_dir, scheduler_settings, ConfigSource};
use crate::layout::GridLayout;
use crate::paths::AppPaths;

/// Display refresh the simulated scroll container is driven at.
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Built-in variants followed by any packs found under `dir`.
pub fn load_library(dir: &Path) -> Result<ShaderLibrary> {
    ShaderLibrary::builtin()
        .with_packs(dir)
        .with_context(|| format!("failed to load variant packs from {}", dir.display()))
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let (config, source) = load_config(args.config.as_deref(), &paths)?;
    if let ConfigSource::File(path) = &source {
        tracing::info!(path = %path.display(), "loaded configuration");
    }
    let settings = scheduler_settings(&config, &args)?;
    let library = load_library(&pack_dir(&config, &paths))?;

    let cards = match args.cards.as_deref() {
        Some(path) => load_cards(path)?,
        None => synthesise_cards(args.count),
    };

    let (card_width, card_height) = config.card_size();
    let (view_width, view_height) = args.viewport;
    let layout = GridLayout::new(view_width, SurfaceSize::new(card_width, card_height));
    let placed = layout.place(&cards);

    let adapter = GpuAdapter::new(gpu_power(args.power.unwrap_or(config.render.power)))
        .context("failed to initialise GPU")?;
    let profile = adapter.profile();
    tracing::info!(
        adapter = %profile.name,
        backend = ?profile.backend,
        software = profile.is_software(),
        "GPU adapter ready"
    );

    let (loss_tx, loss_rx) = unbounded();
    let (signal_tx, signal_rx) = unbounded();
    let mut relay = LossRelay::new(adapter.clone(), loss_rx, signal_tx.clone());
    let factory = GpuFactory::new(adapter, loss_tx);
    let mut scheduler = CardScheduler::new(library, factory, settings, signal_rx)
        .context("failed to build card scheduler")?;

    let surfaces = scheduler.rebuild(&placed);
    let identities: HashMap<SurfaceId, CardIdentity> = surfaces
        .iter()
        .zip(&placed)
        .map(|(surface, card)| (*surface, card.descriptor.identity))
        .collect();

    if config.render.background && !args.no_background {
        scheduler.set_background(SurfaceSize::new(view_width, view_height), Instant::now());
    }

    tracing::info!(
        cards = cards.len(),
        columns = layout.columns(),
        max_active = settings.max_active,
        frames = args.frames,
        "starting card run"
    );

    let mut scroll = ScrollSimulation::new(
        (layout.document_height(cards.len()) - view_height as f32).max(0.0),
        args.scroll_speed,
    );
    let mut totals = RunTotals::default();
    for frame in 0..args.frames {
        let started = Instant::now();
        relay.relay(started);
        if let Some(every) = args.lose_context_every.filter(|every| *every > 0) {
            if frame > 0 && frame % every == 0 {
                inject_context_loss(&scheduler, &signal_tx);
            }
        }

        let viewport = Viewport::new(scroll.offset(), view_width as f32, view_height as f32);
        let report = scheduler.pump(viewport, started);
        totals.record(&report);
        tracing::trace!(
            frame,
            scroll = scroll.offset(),
            live = scheduler.manager().live_count(),
            ?report,
            "frame pumped"
        );
        scroll.step();

        thread::sleep(FRAME_INTERVAL.saturating_sub(started.elapsed()));
    }

    if let Some(dir) = args.snapshot_dir.as_deref() {
        write_snapshots(&scheduler, &identities, dir)?;
    }

    let contexts = scheduler.manager().factory().contexts_created();
    scheduler.teardown_all();
    scheduler.manager_mut().dispose_background();
    log_summary(&scheduler.stats(), &totals, contexts);
    Ok(())
}

/// Scrolls down to `max` and back up again.
#[derive(Debug, Clone, Copy)]
struct ScrollSimulation {
    max: f32,
    speed: f32,
    offset: f32,
    direction: f32,
}

impl ScrollSimulation {
    fn new(max: f32, speed: f32) -> Self {
        Self {
            max,
            speed: speed.abs(),
            offset: 0.0,
            direction: 1.0,
        }
    }

    fn offset(&self) -> f32 {
        self.offset
    }

    fn step(&mut self) {
        if self.max <= 0.0 {
            return;
        }
        self.offset += self.speed * self.direction;
        if self.offset >= self.max {
            self.offset = self.max;
            self.direction = -1.0;
        } else if self.offset <= 0.0 {
            self.offset = 0.0;
            self.direction = 1.0;
        }
    }
}

#[derive(Debug, Default)]
struct RunTotals {
    frames_rendered: u64,
    instance_frames: u64,
    peak_live: usize,
    entered: u64,
    left: u64,
}

impl RunTotals {
    fn record(&mut self, report: &PumpReport) {
        if report.rendered {
            self.frames_rendered += 1;
        }
        self.instance_frames += report.advanced as u64;
        self.peak_live = self.peak_live.max(report.advanced);
        self.entered += report.entered as u64;
        self.left += report.left as u64;
    }
}

fn inject_context_loss(scheduler: &CardScheduler<GpuFactory>, signals: &Sender<ContextSignal>) {
    let Some(context) = scheduler
        .manager()
        .pool()
        .iter()
        .find(|entry| entry.active)
        .map(|entry| entry.context)
    else {
        return;
    };
    tracing::info!(%context, "simulating context loss");
    let _ = signals.send(ContextSignal::Lost(context));
    let _ = signals.send(ContextSignal::Restored(context));
}

fn write_snapshots(
    scheduler: &CardScheduler<GpuFactory>,
    identities: &HashMap<SurfaceId, CardIdentity>,
    dir: &Path,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create snapshot directory {}", dir.display()))?;

    let mut written = 0;
    for entry in scheduler.manager().pool().iter().filter(|entry| entry.active) {
        let Some(identity) = identities.get(&entry.surface) else {
            continue;
        };
        let instance = entry.target.instance();
        let image = match instance.snapshot() {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(surface = %entry.surface, %err, "skipping snapshot");
                continue;
            }
        };
        let path = dir.join(format!(
            "card-{}-{}-{}.png",
            identity.overall,
            identity.group,
            instance.variant_name()
        ));
        image
            .save(&path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        written += 1;
    }
    tracing::info!(written, dir = %dir.display(), "snapshots written");
    Ok(())
}

fn log_summary(stats: &PoolStats, totals: &RunTotals, contexts: u64) {
    tracing::info!(
        frames = totals.frames_rendered,
        instance_frames = totals.instance_frames,
        peak_live = totals.peak_live,
        entered = totals.entered,
        left = totals.left,
        contexts,
        "run finished"
    );
    tracing::info!(
        created = stats.created,
        evicted = stats.evicted,
        disposed = stats.disposed,
        creation_failures = stats.creation_failures,
        contexts_lost = stats.contexts_lost,
        contexts_restored = stats.contexts_restored,
        restores_scheduled = stats.restores_scheduled,
        restores_fired = stats.restores_fired,
        "pool statistics"
    );
}
