//! Per-frame blob kinematics: noise drift, buoyancy, pairwise repulsion,
//! damping, soft containment and visual smoothing.

use crate::blob::BlobEntity;
use crate::camera::{Frustum, Viewport};
use crate::constants::*;
use crate::noise_field::NoiseField;
use crate::population::{InteractionSample, PopulationManager};
use glam::Vec3;
use smallvec::SmallVec;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Upper bound on a single integration step, in seconds.
    pub max_step_sec: f32,
    pub phase_rate: f32,
    pub movement_noise_scale: f32,
    pub force_gain: f32,
    pub damping_per_sec: f32,
    /// Fraction of the viewport extent beyond which blobs are pushed back.
    pub boundary_padding: f32,
    pub depth_range: (f32, f32),
    pub lerp_rate: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            max_step_sec: MAX_FRAME_STEP_SEC,
            phase_rate: PHASE_RATE,
            movement_noise_scale: MOVEMENT_NOISE_SCALE,
            force_gain: FORCE_GAIN,
            damping_per_sec: VELOCITY_DAMPING_PER_SEC,
            boundary_padding: BOUNDARY_PADDING,
            depth_range: (DEPTH_MIN, DEPTH_MAX),
            lerp_rate: LERP_RATE,
        }
    }
}

/// Repulsive impulse applied to `a` by `b`, plus its contribution to `a`'s
/// squish intensity. `None` outside the contact range or for coincident centres.
#[inline]
pub fn repulsion_impulse(
    a: &InteractionSample,
    b: &InteractionSample,
    dt_sec: f32,
) -> Option<(Vec3, f32)> {
    let offset = a.position - b.position;
    let distance = offset.length();
    let threshold = (a.scale + b.scale) * 0.5;
    if distance >= threshold || distance <= REPULSION_MIN_DISTANCE {
        return None;
    }
    let strength = (1.0 - distance / threshold).powf(REPULSION_FALLOFF_EXP)
        * REPULSION_GAIN
        * dt_sec
        * REFERENCE_FPS;
    Some((offset / distance * strength, strength * REPULSION_INTENSITY_SHARE))
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub struct MotionIntegrator {
    noise: NoiseField,
    params: MotionParams,
}

impl MotionIntegrator {
    pub fn new(noise: NoiseField) -> Self {
        Self::with_params(noise, MotionParams::default())
    }

    pub fn with_params(noise: NoiseField, params: MotionParams) -> Self {
        Self { noise, params }
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Frame delta in seconds, clamped so a stall cannot blow up the step.
    #[inline]
    pub fn clamp_step(&self, dt: Duration) -> f32 {
        dt.as_secs_f32().min(self.params.max_step_sec)
    }

    /// Advance every simulated blob by one frame.
    ///
    /// Active blobs whose inflated bounding sphere intersects `frustum` are
    /// reported back through [`PopulationManager::mark_observed`]. Returns the
    /// number of blobs observed.
    pub fn step(
        &self,
        population: &mut PopulationManager,
        frustum: &Frustum,
        dt: Duration,
        now: Duration,
    ) -> usize {
        let dt = self.clamp_step(dt);
        if dt <= 0.0 {
            return 0;
        }
        let snapshot = population.snapshot_for_interaction();
        let viewport = population.viewport();
        let buoyant = population.config().buoyant;

        let mut observed: SmallVec<[String; 32]> = SmallVec::new();
        for (slot, blob) in population.blobs_mut().iter_mut().enumerate() {
            if !blob.is_simulated() {
                continue;
            }
            self.integrate(blob, slot, &snapshot, viewport, buoyant, dt);
            let radius = blob.render_scale() * VIEW_MARGIN;
            if blob.is_active && frustum.intersects_sphere(blob.position, radius) {
                observed.push(blob.id.clone());
            }
        }

        for id in &observed {
            population.mark_observed(id, now);
        }
        observed.len()
    }

    fn integrate(
        &self,
        blob: &mut BlobEntity,
        slot: usize,
        snapshot: &[InteractionSample],
        viewport: Viewport,
        buoyant: bool,
        dt: f32,
    ) {
        blob.phase += dt * self.params.phase_rate;

        let mut force = self.drift_force(blob, dt);
        if buoyant {
            force.y += self.buoyancy(blob, dt);
        }
        blob.velocity += force;

        // pairwise repulsion against the frame-start snapshot
        if let Some(me) = snapshot.get(slot) {
            let mut total = 0.0;
            for (other_slot, other) in snapshot.iter().enumerate() {
                if other_slot == slot || !other.eligible {
                    continue;
                }
                if let Some((impulse, intensity)) = repulsion_impulse(me, other, dt) {
                    blob.velocity += impulse;
                    total += intensity;
                }
            }
            blob.repulsion_intensity = total;
        }

        blob.velocity *= 1.0 - self.params.damping_per_sec * dt;
        self.contain(blob, viewport, dt);
        blob.position += blob.velocity * dt;

        let t = dt * self.params.lerp_rate;
        blob.scale = lerp(blob.scale, blob.target_scale, t).max(MIN_SCALE);
        blob.color = blob.color.lerp(blob.target_color, t);
        blob.opacity = lerp(blob.opacity, blob.target_opacity, t * OPACITY_LERP_BOOST).clamp(0.0, 1.0);
        blob.repulsion_intensity = lerp(blob.repulsion_intensity, 0.0, t * REPULSION_DECAY_BOOST);
    }

    /// Drift from three cross-coupled noise samples, so no axis dominates.
    fn drift_force(&self, blob: &BlobEntity, dt: f32) -> Vec3 {
        let s = self.params.movement_noise_scale;
        let p = blob.position;
        let t = blob.phase * blob.speed_factor * NOISE_TIME_RATE;
        let o = blob.time_offset;
        Vec3::new(
            self.noise.sample3(p.x * s + o, p.y * s, t),
            self.noise.sample3(p.y * s + o, p.z * s, t),
            self.noise.sample3(p.z * s + o, p.x * s, t),
        ) * (blob.speed_factor * dt * self.params.force_gain)
    }

    fn buoyancy(&self, blob: &BlobEntity, dt: f32) -> f32 {
        let t = blob.phase * blob.speed_factor * NOISE_TIME_RATE;
        let key = blob.id.chars().next().map(|c| c as u32 as f32).unwrap_or(0.0);
        (BUOYANCY_BASE + self.noise.sample2(t, key) * BUOYANCY_SPAN) * dt
    }

    /// Nudge velocity back toward the centre once outside the padded bounds.
    fn contain(&self, blob: &mut BlobEntity, viewport: Viewport, dt: f32) {
        let push = BOUNDARY_PUSH * dt * REFERENCE_FPS;
        let half_x = viewport.width * self.params.boundary_padding;
        let half_y = viewport.height * self.params.boundary_padding;
        let (z_min, z_max) = self.params.depth_range;
        let p = blob.position;
        if p.x > half_x {
            blob.velocity.x -= push;
        }
        if p.x < -half_x {
            blob.velocity.x += push;
        }
        if p.y > half_y {
            blob.velocity.y -= push;
        }
        if p.y < -half_y {
            blob.velocity.y += push;
        }
        if p.z > z_max {
            blob.velocity.z -= push;
        }
        if p.z < z_min {
            blob.velocity.z += push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, scale: f32) -> InteractionSample {
        InteractionSample {
            position: Vec3::new(x, 0.0, 0.0),
            scale,
            eligible: true,
        }
    }

    #[test]
    fn repulsion_vanishes_at_threshold() {
        assert!(repulsion_impulse(&sample(0.0, 2.0), &sample(2.0, 2.0), 0.016).is_none());
    }

    #[test]
    fn coincident_centres_are_skipped() {
        assert!(repulsion_impulse(&sample(0.0, 2.0), &sample(0.0, 2.0), 0.016).is_none());
    }

    #[test]
    fn closer_means_stronger() {
        let (near, _) = repulsion_impulse(&sample(0.0, 2.0), &sample(0.5, 2.0), 0.016).unwrap();
        let (far, _) = repulsion_impulse(&sample(0.0, 2.0), &sample(1.5, 2.0), 0.016).unwrap();
        assert!(near.length() > far.length());
    }

    #[test]
    fn step_clamps_large_deltas() {
        let m = MotionIntegrator::new(NoiseField::new(1));
        assert!((m.clamp_step(Duration::from_secs(2)) - MAX_FRAME_STEP_SEC).abs() < 1e-6);
        assert!((m.clamp_step(Duration::from_millis(10)) - 0.01).abs() < 1e-6);
    }
}
