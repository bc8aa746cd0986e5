// Flat `f32` layouts handed across the JS boundary.
//
// Lights: 11 floats each
// `[kind, r, g, b, intensity, x, y, z, distance, decay, cast_shadow]`,
// kind 0 = ambient, 1 = directional, 2 = point.
//
// Material: 11 floats
// `[roughness, metalness, clearcoat, clearcoat_roughness, transmission,
//   thickness_factor, ior, env_map_intensity, emissive_factor,
//   emissive_intensity, opacity_factor]`.

use backdrop_core::{BlobInstance, BlobMesh, Light, LightKind, MaterialParams, Renderer, SceneSetup};
use glam::Vec3;

pub const LIGHT_FLOATS: usize = 11;
pub const MATERIAL_FLOATS: usize = 11;

#[inline]
fn push_vec3(out: &mut Vec<f32>, v: Vec3) {
    out.extend_from_slice(&v.to_array());
}

fn light_kind_code(kind: LightKind) -> f32 {
    match kind {
        LightKind::Ambient => 0.0,
        LightKind::Directional => 1.0,
        LightKind::Point => 2.0,
    }
}

pub fn pack_lights(lights: &[Light]) -> Vec<f32> {
    let mut out = Vec::with_capacity(lights.len() * LIGHT_FLOATS);
    for light in lights {
        out.push(light_kind_code(light.kind));
        push_vec3(&mut out, light.color);
        out.push(light.intensity);
        push_vec3(&mut out, light.position);
        out.push(light.distance);
        out.push(light.decay);
        out.push(if light.cast_shadow { 1.0 } else { 0.0 });
    }
    out
}

pub fn pack_material(m: &MaterialParams) -> [f32; MATERIAL_FLOATS] {
    [
        m.roughness,
        m.metalness,
        m.clearcoat,
        m.clearcoat_roughness,
        m.transmission,
        m.thickness_factor,
        m.ior,
        m.env_map_intensity,
        m.emissive_factor,
        m.emissive_intensity,
        m.opacity_factor,
    ]
}

/// Renderer that only collects instance records for the JS side to upload.
#[derive(Default)]
pub struct InstanceBuffer {
    instances: Vec<BlobInstance>,
}

impl InstanceBuffer {
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl Renderer for InstanceBuffer {
    fn begin_frame(&mut self, _setup: &SceneSetup) {
        self.instances.clear();
    }

    fn submit(&mut self, slot: usize, instance: &BlobInstance, _mesh: &BlobMesh) {
        if slot >= self.instances.len() {
            self.instances.resize(slot + 1, BlobInstance::default());
        }
        self.instances[slot] = *instance;
    }
}
