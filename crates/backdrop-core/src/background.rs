//! Host-facing facade that drives one animated backdrop.
//!
//! A host calls [`Background::frame`] from its animation loop with the time
//! since the previous call. Lifecycle sweeps run on elapsed simulation time,
//! always between frames, so a frame never observes a half-finished sweep.

use crate::camera::Camera;
use crate::constants::CAMERA_DRIFT_PER_FRAME;
use crate::deform::DeformationEngine;
use crate::error::BackdropError;
use crate::mesh::{BlobMesh, MeshCache};
use crate::modes::{BlobMode, ModeCatalog, ModeConfiguration};
use crate::motion::MotionIntegrator;
use crate::noise_field::NoiseField;
use crate::population::{PopulationManager, SweepReport};
use crate::scene::{Renderer, SceneComposer, SceneSetup};
use std::time::Duration;

/// What happened during one [`Background::frame`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub sweep: Option<SweepReport>,
    pub appeared: usize,
    pub observed: usize,
    pub deformed: usize,
    pub visible: usize,
}

type FirstFrameListener = Box<dyn FnOnce()>;

pub struct Background {
    population: PopulationManager,
    motion: MotionIntegrator,
    deformer: DeformationEngine,
    composer: SceneComposer,
    camera: Camera,
    mesh_cache: MeshCache,
    meshes: Vec<BlobMesh>,
    elapsed: Duration,
    next_sweep: Duration,
    frames: u64,
    first_frame_listeners: Vec<FirstFrameListener>,
}

impl Background {
    pub fn new(
        mode_id: &str,
        width_px: u32,
        height_px: u32,
        seed: u64,
    ) -> Result<Self, BackdropError> {
        let mut camera = Camera::default();
        camera.set_viewport_px(width_px, height_px);
        let population = PopulationManager::new(mode_id, camera.viewport(), Duration::ZERO, seed)?;
        let noise_seed = seed as u32;
        let mut background = Self {
            motion: MotionIntegrator::new(NoiseField::new(noise_seed)),
            deformer: DeformationEngine::new(NoiseField::new(noise_seed)),
            composer: SceneComposer::new(population.mode()),
            next_sweep: population.params().sweep_interval,
            population,
            camera,
            mesh_cache: MeshCache::default(),
            meshes: Vec::new(),
            elapsed: Duration::ZERO,
            frames: 0,
            first_frame_listeners: Vec::new(),
        };
        background.rebuild_meshes();
        Ok(background)
    }

    /// Switch modes. An unknown id leaves the running scene untouched.
    pub fn set_mode(&mut self, mode_id: &str) -> Result<(), BackdropError> {
        let config = ModeCatalog::resolve(mode_id)?;
        self.activate(config);
        Ok(())
    }

    /// Mode that [`Self::cycle_mode`] would switch to.
    pub fn next_mode(&self) -> BlobMode {
        self.population.mode().next()
    }

    /// Advance to the next mode in the theme cycle and return it.
    pub fn cycle_mode(&mut self) -> BlobMode {
        let next = self.next_mode();
        self.activate(next.config());
        next
    }

    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.camera.set_viewport_px(width_px, height_px);
        self.population.set_viewport(self.camera.viewport());
        log::debug!("[background] resize {}x{}", width_px, height_px);
    }

    /// Advance the simulation by `dt` and hand the scene to `renderer`.
    pub fn frame<R: Renderer + ?Sized>(&mut self, dt: Duration, renderer: &mut R) -> FrameStats {
        self.elapsed += dt;
        let now = self.elapsed;
        let mut stats = FrameStats::default();

        if now >= self.next_sweep {
            stats.sweep = Some(self.population.tick_lifecycle(now));
            let interval = self.population.params().sweep_interval;
            while self.next_sweep <= now {
                self.next_sweep += interval;
            }
            self.grow_meshes();
        }

        stats.appeared = self.population.drain_appearances(now);
        let frustum = self.camera.frustum();
        stats.observed = self.motion.step(&mut self.population, &frustum, dt, now);

        let elapsed_sec = now.as_secs_f32();
        for (blob, mesh) in self.population.blobs().iter().zip(self.meshes.iter_mut()) {
            if self.deformer.deform(blob, mesh, elapsed_sec) {
                stats.deformed += 1;
            }
        }

        self.camera.orbit_azimuth(CAMERA_DRIFT_PER_FRAME);
        stats.visible = self
            .composer
            .compose(self.population.blobs(), &self.meshes, renderer);

        self.frames += 1;
        if self.frames == 1 {
            for listener in self.first_frame_listeners.drain(..) {
                listener();
            }
        }
        stats
    }

    /// Register a callback for the first rendered frame. Fires immediately if
    /// a frame has already been rendered.
    pub fn on_first_frame_rendered(&mut self, listener: impl FnOnce() + 'static) {
        if self.frames > 0 {
            listener();
        } else {
            self.first_frame_listeners.push(Box::new(listener));
        }
    }

    pub fn mode(&self) -> BlobMode {
        self.population.mode()
    }

    pub fn population(&self) -> &PopulationManager {
        &self.population
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene_setup(&self) -> &SceneSetup {
        self.composer.setup()
    }

    pub fn composer(&self) -> &SceneComposer {
        &self.composer
    }

    /// Meshes in slot order, one per blob.
    pub fn meshes(&self) -> &[BlobMesh] {
        &self.meshes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    fn activate(&mut self, config: &'static ModeConfiguration) {
        let viewport = self.camera.viewport();
        self.population
            .initialize_population(config, viewport, self.elapsed);
        self.composer.set_mode(config.mode);
        self.next_sweep = self.elapsed + self.population.params().sweep_interval;
        self.rebuild_meshes();
    }

    fn rebuild_meshes(&mut self) {
        self.meshes.clear();
        self.grow_meshes();
    }

    /// Give every slot without a mesh one of the current geometry.
    fn grow_meshes(&mut self) {
        let kind = self.population.config().geometry;
        while self.meshes.len() < self.population.len() {
            self.meshes.push(self.mesh_cache.instantiate(kind));
        }
    }
}
