//! Blob records and their randomized construction.

use crate::camera::Viewport;
use crate::color;
use crate::constants::*;
use crate::modes::{GeometryKind, ModeConfiguration};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{FRAC_PI_4, TAU};
use std::time::Duration;

/// One simulated lava blob.
///
/// Visual scalars come in current/target/base form: the current value is
/// lerped toward the target every frame, the base anchors per-instance variation.
#[derive(Clone, Debug)]
pub struct BlobEntity {
    pub id: String,
    pub position: Vec3,
    pub velocity: Vec3,

    pub scale: f32,
    pub target_scale: f32,
    pub base_scale: f32,

    pub color: Vec3,
    pub target_color: Vec3,
    pub base_color: Vec3,

    pub opacity: f32,
    pub target_opacity: f32,

    pub speed_factor: f32,
    /// Transient squish from collisions; decays back to 0.
    pub repulsion_intensity: f32,
    pub morph_intensity: f32,
    pub morph_speed: f32,
    pub geometry: GeometryKind,
    pub time_offset: f32,
    /// Internal motion clock, starts at `time_offset`.
    pub phase: f32,

    pub is_active: bool,
    pub has_appeared: bool,
    pub initial_delay: Duration,
    pub last_active: Duration,
    /// Bumped on every in-place reset so stale appearance events can be told apart.
    pub generation: u32,
}

/// Coarse lifecycle state derived from the flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobPhase {
    Pending,
    Visible,
    FadingOut,
}

impl BlobEntity {
    pub fn phase_state(&self) -> BlobPhase {
        match (self.has_appeared, self.is_active) {
            (false, _) => BlobPhase::Pending,
            (true, true) => BlobPhase::Visible,
            (true, false) => BlobPhase::FadingOut,
        }
    }

    /// Inactive and effectively transparent: safe to recycle.
    #[inline]
    pub fn is_faded(&self) -> bool {
        !self.is_active && self.opacity < FADED_OPACITY
    }

    /// Takes part in motion, repulsion and morphing this frame.
    #[inline]
    pub fn is_simulated(&self) -> bool {
        self.has_appeared && !self.is_faded()
    }

    /// Scale handed to the renderer; never below the degenerate-geometry floor.
    #[inline]
    pub fn render_scale(&self) -> f32 {
        self.scale.max(MIN_SCALE)
    }

    #[inline]
    pub fn is_rendered(&self) -> bool {
        self.opacity > VISIBLE_OPACITY
    }
}

/// Builds blobs for a mode from an injected random source.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlobFactory;

impl BlobFactory {
    /// Create a fresh, invisible blob.
    ///
    /// Initial members spawn near the view centre and appear after 200 ms.
    /// Later arrivals enter from one of four edge patterns chosen by
    /// `arrival_index` and wait 5-6 s.
    pub fn create<R: Rng>(
        rng: &mut R,
        id: String,
        viewport: Viewport,
        config: &ModeConfiguration,
        is_initial_member: bool,
        arrival_index: usize,
        now: Duration,
    ) -> BlobEntity {
        let (min_scale, max_scale) = config.scale_range;
        let base_scale = rng.gen::<f32>() * (max_scale - min_scale) + min_scale;

        let position = if is_initial_member {
            central_spawn(rng, viewport)
        } else {
            edge_spawn(rng, viewport, arrival_index)
        };

        let base_color = if config.palette.is_empty() {
            Vec3::ONE
        } else {
            color::from_hex(config.palette[rng.gen_range(0..config.palette.len())])
        };

        let (min_speed, max_speed) = config.speed_range;
        let speed_factor =
            (rng.gen::<f32>() * (max_speed - min_speed) + min_speed) * jitter(rng, SPEED_JITTER);
        let morph_intensity = config.morph_intensity * jitter(rng, MORPH_JITTER);
        let morph_speed = config.morph_speed * jitter(rng, MORPH_JITTER);
        let time_offset = rng.gen::<f32>() * TIME_OFFSET_MAX;

        let initial_delay = if is_initial_member {
            Duration::from_millis(INITIAL_DELAY_MS)
        } else {
            Duration::from_millis(rng.gen_range(ARRIVAL_DELAY_MIN_MS..ARRIVAL_DELAY_MAX_MS))
        };

        BlobEntity {
            id,
            position,
            velocity: Vec3::ZERO,
            scale: MIN_SCALE,
            target_scale: base_scale,
            base_scale,
            color: color::offset_hsl(base_color, 0.0, 0.05, 0.1),
            target_color: base_color,
            base_color,
            opacity: 0.0,
            target_opacity: 0.0,
            speed_factor,
            repulsion_intensity: 0.0,
            morph_intensity,
            morph_speed,
            geometry: config.geometry,
            time_offset,
            phase: time_offset,
            is_active: true,
            has_appeared: false,
            initial_delay,
            last_active: now,
            generation: 0,
        }
    }
}

#[inline]
fn jitter<R: Rng>(rng: &mut R, range: f32) -> f32 {
    1.0 + (rng.gen::<f32>() - 0.5) * range
}

#[inline]
fn centered<R: Rng>(rng: &mut R, span: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * span
}

fn central_spawn<R: Rng>(rng: &mut R, viewport: Viewport) -> Vec3 {
    Vec3::new(
        centered(rng, viewport.width * SPAWN_CENTER_FRACTION),
        centered(rng, viewport.height * SPAWN_CENTER_FRACTION),
        centered(rng, SPAWN_DEPTH_SPAN) + SPAWN_DEPTH_BIAS,
    )
}

fn edge_spawn<R: Rng>(rng: &mut R, viewport: Viewport, arrival_index: usize) -> Vec3 {
    let angle = (arrival_index as f32 / SPAWN_ARRIVAL_SPREAD) * TAU + rng.gen::<f32>() * 0.5;
    let radius_x = viewport.width * 0.5 * SPAWN_EDGE_FACTOR;
    let radius_y = viewport.height * 0.5 * SPAWN_EDGE_FACTOR;
    let depth_radius = SPAWN_DEPTH_RADIUS * SPAWN_EDGE_FACTOR;
    let jitter_w = viewport.width * SPAWN_EDGE_JITTER_FRACTION;
    let jitter_h = viewport.height * SPAWN_EDGE_JITTER_FRACTION;

    match arrival_index % 4 {
        // left/right edges
        0 => Vec3::new(
            angle.cos() * radius_x,
            centered(rng, jitter_h),
            centered(rng, SPAWN_DEPTH_SPAN),
        ),
        // top/bottom
        1 => Vec3::new(
            centered(rng, jitter_w),
            angle.sin() * radius_y,
            centered(rng, SPAWN_DEPTH_SPAN),
        ),
        // front/back
        2 => Vec3::new(
            centered(rng, jitter_w),
            centered(rng, jitter_h),
            angle.cos() * depth_radius,
        ),
        // corners
        _ => Vec3::new(
            angle.cos() * radius_x * 0.7,
            angle.sin() * radius_y * 0.7,
            (angle + FRAC_PI_4).cos() * depth_radius * 0.7,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::BlobMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn viewport() -> Viewport {
        Viewport::new(20.0, 14.0)
    }

    #[test]
    fn new_blob_is_invisible_and_pending() {
        let mut rng = StdRng::seed_from_u64(1);
        let cfg = BlobMode::Standard.config();
        let b = BlobFactory::create(&mut rng, "b".into(), viewport(), cfg, true, 0, Duration::ZERO);
        assert_eq!(b.opacity, 0.0);
        assert_eq!(b.target_opacity, 0.0);
        assert!(!b.has_appeared);
        assert!(b.is_active);
        assert_eq!(b.scale, MIN_SCALE);
        assert_eq!(b.phase_state(), BlobPhase::Pending);
        assert!(b.base_scale >= 1.8 && b.base_scale <= 3.8);
    }

    #[test]
    fn speed_stays_within_jittered_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let cfg = BlobMode::Swarm.config();
        for i in 0..200 {
            let b = BlobFactory::create(&mut rng, format!("b{i}"), viewport(), cfg, false, i, Duration::ZERO);
            assert!(b.speed_factor >= cfg.speed_range.0 * 0.925 - 1e-6);
            assert!(b.speed_factor <= cfg.speed_range.1 * 1.075 + 1e-6);
        }
    }

    #[test]
    fn initial_members_spawn_centrally() {
        let mut rng = StdRng::seed_from_u64(3);
        let cfg = BlobMode::Molten.config();
        for i in 0..100 {
            let b = BlobFactory::create(&mut rng, format!("b{i}"), viewport(), cfg, true, i, Duration::ZERO);
            assert!(b.position.x.abs() <= 20.0 * 0.15 + 1e-4);
            assert!(b.position.y.abs() <= 14.0 * 0.15 + 1e-4);
            assert!(b.position.z <= 0.0 && b.position.z >= -10.0);
        }
    }

    #[test]
    fn side_arrivals_start_near_an_edge() {
        let mut rng = StdRng::seed_from_u64(4);
        let cfg = BlobMode::Standard.config();
        // index 0 uses the side pattern with angle in [0, 0.5)
        let b = BlobFactory::create(&mut rng, "b".into(), viewport(), cfg, false, 0, Duration::ZERO);
        assert!(b.position.x > 20.0 * 0.5 * 1.1 * 0.5f32.cos() - 1e-3);
    }
}
