//! Per-mode lighting, environment and material tuning, and hand-off of blob
//! instances to an external renderer.

use crate::blob::BlobEntity;
use crate::color::from_hex;
use crate::mesh::BlobMesh;
use crate::modes::BlobMode;
use glam::Vec3;
use smallvec::{smallvec, SmallVec};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// Unused for ambient lights.
    pub position: Vec3,
    /// Point light cutoff; 0 means unlimited.
    pub distance: f32,
    pub decay: f32,
    pub cast_shadow: bool,
}

impl Light {
    fn ambient(hex: u32, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color: from_hex(hex),
            intensity,
            position: Vec3::ZERO,
            distance: 0.0,
            decay: 0.0,
            cast_shadow: false,
        }
    }

    fn directional(hex: u32, intensity: f32, position: [f32; 3]) -> Self {
        Self {
            kind: LightKind::Directional,
            color: from_hex(hex),
            intensity,
            position: Vec3::from(position),
            distance: 0.0,
            decay: 0.0,
            cast_shadow: true,
        }
    }

    fn point(hex: u32, intensity: f32, position: [f32; 3]) -> Self {
        Self {
            kind: LightKind::Point,
            color: from_hex(hex),
            intensity,
            position: Vec3::from(position),
            distance: 0.0,
            decay: 2.0,
            cast_shadow: false,
        }
    }

    fn with_falloff(mut self, distance: f32, decay: f32) -> Self {
        self.distance = distance;
        self.decay = decay;
        self
    }
}

pub type LightingRig = SmallVec<[Light; 3]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentPreset {
    City,
    Sunset,
    Forest,
    Night,
    Dawn,
}

impl EnvironmentPreset {
    pub fn name(self) -> &'static str {
        match self {
            EnvironmentPreset::City => "city",
            EnvironmentPreset::Sunset => "sunset",
            EnvironmentPreset::Forest => "forest",
            EnvironmentPreset::Night => "night",
            EnvironmentPreset::Dawn => "dawn",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    pub preset: EnvironmentPreset,
    pub blur: f32,
}

/// Physical material tuning, fixed per mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transmission: f32,
    /// Multiplied by the blob's current scale.
    pub thickness_factor: f32,
    pub ior: f32,
    pub env_map_intensity: f32,
    /// Multiplied by the blob's current colour.
    pub emissive_factor: f32,
    pub emissive_intensity: f32,
    /// Multiplied by the blob's current opacity.
    pub opacity_factor: f32,
}

/// Everything the renderer needs once per mode activation.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSetup {
    pub mode: BlobMode,
    pub lighting: LightingRig,
    pub environment: Environment,
    pub material: MaterialParams,
}

impl SceneSetup {
    pub fn for_mode(mode: BlobMode) -> Self {
        Self {
            mode,
            lighting: lighting_for(mode),
            environment: environment_for(mode),
            material: material_for(mode),
        }
    }
}

/// Packed per-blob record, laid out for direct upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlobInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 3],
    pub opacity: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub thickness: f32,
    pub visible: u32,
    pub _pad: [u32; 2],
}

impl BlobInstance {
    /// Stride in `f32` units.
    pub const FLOATS: usize = std::mem::size_of::<BlobInstance>() / 4;

    pub fn is_visible(&self) -> bool {
        self.visible != 0
    }
}

/// Black-box renderer fed by [`SceneComposer`].
pub trait Renderer {
    fn begin_frame(&mut self, setup: &SceneSetup);
    fn submit(&mut self, slot: usize, instance: &BlobInstance, mesh: &BlobMesh);
    fn end_frame(&mut self) {}
}

pub struct SceneComposer {
    setup: SceneSetup,
}

impl SceneComposer {
    pub fn new(mode: BlobMode) -> Self {
        Self {
            setup: SceneSetup::for_mode(mode),
        }
    }

    pub fn set_mode(&mut self, mode: BlobMode) {
        if self.setup.mode != mode {
            self.setup = SceneSetup::for_mode(mode);
        }
    }

    pub fn setup(&self) -> &SceneSetup {
        &self.setup
    }

    pub fn instance(&self, blob: &BlobEntity) -> BlobInstance {
        let m = &self.setup.material;
        let scale = blob.render_scale();
        BlobInstance {
            position: blob.position.to_array(),
            scale,
            color: blob.color.to_array(),
            opacity: blob.opacity * m.opacity_factor,
            emissive: (blob.color * m.emissive_factor).to_array(),
            emissive_intensity: m.emissive_intensity,
            thickness: m.thickness_factor * scale,
            visible: blob.is_rendered() as u32,
            _pad: [0; 2],
        }
    }

    /// Submit every blob, active or not; fading blobs still need drawing.
    /// Returns how many submitted instances are visible.
    pub fn compose<R: Renderer + ?Sized>(
        &self,
        blobs: &[BlobEntity],
        meshes: &[BlobMesh],
        renderer: &mut R,
    ) -> usize {
        renderer.begin_frame(&self.setup);
        let mut visible = 0;
        for (slot, (blob, mesh)) in blobs.iter().zip(meshes).enumerate() {
            let instance = self.instance(blob);
            visible += instance.is_visible() as usize;
            renderer.submit(slot, &instance, mesh);
        }
        renderer.end_frame();
        visible
    }
}

pub fn environment_for(mode: BlobMode) -> Environment {
    let preset = match mode {
        BlobMode::Molten => EnvironmentPreset::Sunset,
        BlobMode::Bioluminescent => EnvironmentPreset::Forest,
        BlobMode::Leviathan => EnvironmentPreset::Night,
        BlobMode::Swarm => EnvironmentPreset::Dawn,
        BlobMode::Standard => EnvironmentPreset::City,
    };
    let blur = if mode == BlobMode::Standard { 0.35 } else { 0.3 };
    Environment { preset, blur }
}

pub fn lighting_for(mode: BlobMode) -> LightingRig {
    match mode {
        BlobMode::Standard => smallvec![
            Light::ambient(0xFFF0E5, 0.8),
            Light::directional(0xFFDAB9, 1.8, [18.0, 22.0, 18.0]),
            Light::point(0xFFA07A, 1.0, [-15.0, -15.0, -15.0]),
        ],
        BlobMode::Molten => smallvec![
            Light::ambient(0xFFF8DC, 0.7),
            Light::directional(0xFFA500, 2.2, [12.0, 6.0, 6.0]),
            Light::point(0xFF8C00, 1.5, [-10.0, -6.0, -6.0]),
        ],
        BlobMode::Bioluminescent => smallvec![
            Light::ambient(0xAFEEEE, 0.6),
            Light::directional(0x98FB98, 1.5, [6.0, 12.0, 6.0]),
            Light::point(0xFFD700, 1.8, [0.0, 0.0, 6.0]).with_falloff(40.0, 1.4),
        ],
        BlobMode::Leviathan => smallvec![
            Light::ambient(0xFFC0CB, 0.5),
            Light::directional(0xFF7F50, 1.2, [20.0, 25.0, 20.0]),
            Light::point(0xFF6347, 0.8, [-20.0, -15.0, -20.0]),
        ],
        BlobMode::Swarm => smallvec![
            Light::ambient(0xFFF5EE, 0.9),
            Light::directional(0xFFDEAD, 2.0, [15.0, 20.0, 10.0]),
            Light::point(0xFFB6C1, 1.2, [-15.0, -10.0, -15.0]),
        ],
    }
}

pub fn material_for(mode: BlobMode) -> MaterialParams {
    match mode {
        BlobMode::Leviathan => MaterialParams {
            roughness: 0.01,
            metalness: 0.3,
            clearcoat: 1.0,
            clearcoat_roughness: 0.03,
            transmission: 0.85,
            thickness_factor: 1.7,
            ior: 1.55,
            env_map_intensity: 1.2,
            emissive_factor: 0.3,
            emissive_intensity: 0.75,
            opacity_factor: 0.65,
        },
        BlobMode::Standard => MaterialParams {
            roughness: 0.06,
            metalness: 0.02,
            clearcoat: 0.3,
            clearcoat_roughness: 0.3,
            transmission: 0.8,
            thickness_factor: 0.9,
            ior: 1.33,
            env_map_intensity: 1.0,
            emissive_factor: 0.0,
            emissive_intensity: 0.0,
            opacity_factor: 0.75,
        },
        BlobMode::Molten | BlobMode::Bioluminescent | BlobMode::Swarm => {
            let (emissive_factor, emissive_intensity) = match mode {
                BlobMode::Molten => (0.8, 0.75),
                BlobMode::Bioluminescent => (0.7, 0.75),
                _ => (0.0, 0.0),
            };
            MaterialParams {
                roughness: 0.03,
                metalness: 0.15,
                clearcoat: 0.8,
                clearcoat_roughness: 0.07,
                transmission: 0.7,
                thickness_factor: 1.2,
                ior: 1.45,
                env_map_intensity: 0.8,
                emissive_factor,
                emissive_intensity,
                opacity_factor: 0.8,
            }
        }
    }
}
