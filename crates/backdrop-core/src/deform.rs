//! Procedural surface morphing.
//!
//! Every vertex is pushed along its own direction from the centre by a
//! noise sample, so blobs wobble organically instead of inflating uniformly.
//! Collisions temporarily raise the amplitude through `repulsion_intensity`.

use crate::blob::BlobEntity;
use crate::constants::*;
use crate::mesh::BlobMesh;
use crate::noise_field::NoiseField;

pub struct DeformationEngine {
    noise: NoiseField,
}

impl DeformationEngine {
    pub fn new(noise: NoiseField) -> Self {
        Self { noise }
    }

    /// Effective morph amplitude for this frame.
    #[inline]
    pub fn intensity(blob: &BlobEntity) -> f32 {
        blob.morph_intensity + blob.repulsion_intensity * MORPH_REPULSION_GAIN
    }

    /// Rewrite `mesh.positions` from its rest buffer for time `elapsed_sec`.
    ///
    /// Blobs that have not appeared or are not rendered are left untouched.
    pub fn deform(&self, blob: &BlobEntity, mesh: &mut BlobMesh, elapsed_sec: f32) -> bool {
        if !blob.has_appeared || !blob.is_rendered() {
            return false;
        }
        self.displace(blob, mesh, elapsed_sec);
        mesh.recompute_normals();
        true
    }

    fn displace(&self, blob: &BlobEntity, mesh: &mut BlobMesh, elapsed_sec: f32) {
        let morph_time = elapsed_sec * blob.morph_speed * MORPH_TIME_RATE + blob.time_offset;
        let intensity = Self::intensity(blob);
        let base_scale = blob.base_scale.max(MIN_SCALE);
        let sampling = MORPH_SAMPLING / base_scale;
        let [dx, dy, dz] = MORPH_DRIFT;

        mesh.displace_from_rest(|v| {
            let n = v.normalize_or_zero();
            let radial = MORPH_RADIAL_BASE
                + MORPH_RADIAL_SPAN * (v.length() * MORPH_RADIAL_FREQ + morph_time).sin();
            let factor = intensity * base_scale * radial;
            let displacement = self.noise.sample3(
                n.x * sampling + morph_time * dx,
                n.y * sampling + morph_time * dy,
                n.z * sampling + morph_time * dz,
            ) * factor;
            v * (1.0 + displacement)
        });
    }
}
