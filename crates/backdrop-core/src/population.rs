//! Blob pool ownership, delayed appearance and the periodic lifecycle sweep.
//!
//! Per-blob state machine:
//! `Pending -> Visible -> FadingOut -> (reset in place) -> Pending`.
//! A mode switch discards the whole pool and starts over in `Pending`.
//!
//! Appearance delays are scheduled events in a single queue owned by the
//! manager. Each event carries the pool epoch and the blob generation it was
//! scheduled for, so events that outlive a mode switch or a reset are dropped
//! without touching any blob.

use crate::blob::{BlobEntity, BlobFactory};
use crate::camera::Viewport;
use crate::constants::{INACTIVITY_THRESHOLD_MS, SWEEP_INTERVAL_MS};
use crate::error::BackdropError;
use crate::modes::{BlobMode, ModeCatalog, ModeConfiguration};
use fnv::FnvHashMap;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// Lifecycle timing knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LifecycleParams {
    /// Period of `tick_lifecycle` when driven by [`crate::Background`].
    pub sweep_interval: Duration,
    /// Idle time after which a visible blob starts fading out.
    pub inactivity_threshold: Duration,
}

impl Default for LifecycleParams {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(SWEEP_INTERVAL_MS),
            inactivity_threshold: Duration::from_millis(INACTIVITY_THRESHOLD_MS),
        }
    }
}

/// What a single sweep changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub faded: usize,
    pub reset: usize,
    pub added: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.faded == 0 && self.reset == 0 && self.added == 0
    }
}

/// Read-only view of one slot used by pairwise interaction.
#[derive(Clone, Copy, Debug)]
pub struct InteractionSample {
    pub position: Vec3,
    pub scale: f32,
    /// Appeared and not yet faded away.
    pub eligible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AppearanceEvent {
    due: Duration,
    slot: usize,
    generation: u32,
    epoch: u32,
}

impl Ord for AppearanceEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.slot.cmp(&other.slot))
            .then_with(|| self.generation.cmp(&other.generation))
            .then_with(|| self.epoch.cmp(&other.epoch))
    }
}

impl PartialOrd for AppearanceEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct PopulationManager {
    config: &'static ModeConfiguration,
    params: LifecycleParams,
    viewport: Viewport,
    blobs: Vec<BlobEntity>,
    index: FnvHashMap<String, usize>,
    events: BinaryHeap<Reverse<AppearanceEvent>>,
    epoch: u32,
    rng: StdRng,
}

impl PopulationManager {
    /// Build and populate the pool for `mode_id`.
    pub fn new(
        mode_id: &str,
        viewport: Viewport,
        now: Duration,
        seed: u64,
    ) -> Result<Self, BackdropError> {
        Self::with_params(mode_id, viewport, now, seed, LifecycleParams::default())
    }

    pub fn with_params(
        mode_id: &str,
        viewport: Viewport,
        now: Duration,
        seed: u64,
        params: LifecycleParams,
    ) -> Result<Self, BackdropError> {
        let config = ModeCatalog::resolve(mode_id)?;
        let mut manager = Self {
            config,
            params,
            viewport,
            blobs: Vec::with_capacity(config.pool_capacity),
            index: FnvHashMap::default(),
            events: BinaryHeap::new(),
            epoch: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        manager.initialize_population(config, viewport, now);
        Ok(manager)
    }

    /// Replace the pool with `population_count` fresh blobs for `config`.
    ///
    /// The first `baseline_count` blobs are initial members, the rest are
    /// staggered arrivals. Pending appearance events of the old pool are dropped.
    pub fn initialize_population(
        &mut self,
        config: &'static ModeConfiguration,
        viewport: Viewport,
        now: Duration,
    ) {
        self.config = config;
        self.viewport = viewport;
        self.epoch = self.epoch.wrapping_add(1);
        self.events.clear();
        self.blobs.clear();
        self.index.clear();

        let baseline = config.baseline_count.min(config.population_count);
        for i in 0..config.population_count {
            let is_initial = i < baseline;
            let arrival_index = if is_initial { i } else { i - baseline };
            let blob = BlobFactory::create(
                &mut self.rng,
                blob_id(i, config.mode),
                viewport,
                config,
                is_initial,
                arrival_index,
                now,
            );
            self.push_blob(blob, now);
        }
        log::info!(
            "[population] mode={} blobs={} pool={} viewport={:.1}x{:.1}",
            config.mode,
            self.blobs.len(),
            config.pool_capacity,
            viewport.width,
            viewport.height
        );
    }

    /// Switch to another mode. On an unknown id the current pool is kept as is.
    pub fn switch_mode(
        &mut self,
        mode_id: &str,
        viewport: Viewport,
        now: Duration,
    ) -> Result<(), BackdropError> {
        let config = ModeCatalog::resolve(mode_id)?;
        self.initialize_population(config, viewport, now);
        Ok(())
    }

    /// Periodic sweep: fade idle blobs, recycle faded ones, top up the pool.
    pub fn tick_lifecycle(&mut self, now: Duration) -> SweepReport {
        let mut report = SweepReport::default();
        let config = self.config;
        let active_at_start = self.active_appeared_count();
        let mut budget = config.population_count.saturating_sub(active_at_start);

        for slot in 0..self.blobs.len() {
            let blob = &self.blobs[slot];
            let idle = now.saturating_sub(blob.last_active);
            if blob.is_active && blob.has_appeared && idle > self.params.inactivity_threshold {
                let blob = &mut self.blobs[slot];
                blob.is_active = false;
                blob.target_opacity = 0.0;
                budget += 1;
                report.faded += 1;
            } else if budget > 0 && blob.is_faded() {
                self.reset_slot(slot, now);
                budget -= 1;
                report.reset += 1;
            }
        }

        let len = self.blobs.len();
        if len < config.pool_capacity && active_at_start < config.population_count {
            let to_add = config
                .population_count
                .saturating_sub(len)
                .min(config.pool_capacity - len);
            for i in 0..to_add {
                let blob = BlobFactory::create(
                    &mut self.rng,
                    blob_id(len + i, config.mode),
                    self.viewport,
                    config,
                    false,
                    i,
                    now,
                );
                self.push_blob(blob, now);
            }
            report.added = to_add;
        }

        if !report.is_empty() {
            log::debug!(
                "[population] sweep faded={} reset={} added={} active={}",
                report.faded,
                report.reset,
                report.added,
                self.active_count()
            );
        }
        report
    }

    /// Fire every appearance event due at `now`. Returns how many blobs appeared.
    pub fn drain_appearances(&mut self, now: Duration) -> usize {
        let mut appeared = 0;
        while let Some(Reverse(ev)) = self.events.peek().copied() {
            if ev.due > now {
                break;
            }
            self.events.pop();
            if ev.epoch != self.epoch {
                continue;
            }
            let Some(blob) = self.blobs.get_mut(ev.slot) else {
                continue;
            };
            if blob.generation != ev.generation || blob.has_appeared {
                continue;
            }
            blob.has_appeared = true;
            blob.target_opacity = 1.0;
            appeared += 1;
            log::trace!("[population] {} appeared", blob.id);
        }
        appeared
    }

    /// Record that `id` was seen on screen; keeps it from timing out.
    pub fn mark_observed(&mut self, id: &str, now: Duration) -> bool {
        match self.index.get(id).and_then(|&slot| self.blobs.get_mut(slot)) {
            Some(blob) => {
                blob.last_active = now;
                true
            }
            None => false,
        }
    }

    /// Positions and scales of every slot, in slot order.
    ///
    /// Pairwise interaction reads only this snapshot, so a spatial index can
    /// replace it later without touching the integrator.
    pub fn snapshot_for_interaction(&self) -> Vec<InteractionSample> {
        self.blobs
            .iter()
            .map(|b| InteractionSample {
                position: b.position,
                scale: b.scale,
                eligible: b.is_simulated(),
            })
            .collect()
    }

    /// Viewport used for future spawns.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn mode(&self) -> BlobMode {
        self.config.mode
    }

    pub fn config(&self) -> &'static ModeConfiguration {
        self.config
    }

    pub fn params(&self) -> &LifecycleParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn blobs(&self) -> &[BlobEntity] {
        &self.blobs
    }

    pub fn blobs_mut(&mut self) -> &mut [BlobEntity] {
        &mut self.blobs
    }

    pub fn get(&self, id: &str) -> Option<&BlobEntity> {
        self.index.get(id).and_then(|&slot| self.blobs.get(slot))
    }

    pub fn active_count(&self) -> usize {
        self.blobs.iter().filter(|b| b.is_active).count()
    }

    pub fn visible_count(&self) -> usize {
        self.blobs.iter().filter(|b| b.is_rendered()).count()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn active_appeared_count(&self) -> usize {
        self.blobs
            .iter()
            .filter(|b| b.is_active && b.has_appeared)
            .count()
    }

    fn reset_slot(&mut self, slot: usize, now: Duration) {
        let config = self.config;
        let old = &self.blobs[slot];
        let id = old.id.clone();
        let generation = old.generation.wrapping_add(1);
        let is_initial = slot < config.baseline_count;

        let mut fresh =
            BlobFactory::create(&mut self.rng, id, self.viewport, config, is_initial, 0, now);
        fresh.generation = generation;
        // opacity and target stay at 0 until the new appearance event fires
        self.schedule(slot, &fresh, now);
        self.blobs[slot] = fresh;
    }

    fn push_blob(&mut self, blob: BlobEntity, now: Duration) {
        let slot = self.blobs.len();
        self.schedule(slot, &blob, now);
        self.index.insert(blob.id.clone(), slot);
        self.blobs.push(blob);
    }

    fn schedule(&mut self, slot: usize, blob: &BlobEntity, now: Duration) {
        self.events.push(Reverse(AppearanceEvent {
            due: now + blob.initial_delay,
            slot,
            generation: blob.generation,
            epoch: self.epoch,
        }));
    }
}

fn blob_id(index: usize, mode: BlobMode) -> String {
    format!("blob-{index}-{mode}")
}
