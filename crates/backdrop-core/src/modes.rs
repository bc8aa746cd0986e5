//! Visual modes and their static configuration table.

use crate::error::BackdropError;
use std::fmt;
use std::str::FromStr;

/// Mesh family used for every blob of a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// UV sphere with `segments` slices and stacks.
    Sphere { segments: u32 },
    /// Icosahedron subdivided `detail` times per edge and projected to the unit sphere.
    Icosahedron { detail: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobMode {
    Standard,
    Leviathan,
    Molten,
    Bioluminescent,
    Swarm,
}

impl BlobMode {
    pub const ALL: [BlobMode; 5] = [
        BlobMode::Standard,
        BlobMode::Leviathan,
        BlobMode::Molten,
        BlobMode::Bioluminescent,
        BlobMode::Swarm,
    ];

    /// Canonical identifier, also used in blob ids.
    pub fn name(self) -> &'static str {
        match self {
            BlobMode::Standard => "standard",
            BlobMode::Leviathan => "leviathan",
            BlobMode::Molten => "molten",
            BlobMode::Bioluminescent => "bioluminescent",
            BlobMode::Swarm => "swarm",
        }
    }

    /// Presentation label shown by the host's theme picker.
    pub fn label(self) -> &'static str {
        match self {
            BlobMode::Standard => "calm",
            BlobMode::Leviathan => "large-slow",
            BlobMode::Molten => "energetic",
            BlobMode::Bioluminescent => "glowing",
            BlobMode::Swarm => "many-small",
        }
    }

    /// Successor in the theme cycle; wraps from the last mode to the first.
    pub fn next(self) -> BlobMode {
        let i = BlobMode::ALL.iter().position(|&m| m == self).unwrap_or(0);
        BlobMode::ALL[(i + 1) % BlobMode::ALL.len()]
    }

    pub fn config(self) -> &'static ModeConfiguration {
        match self {
            BlobMode::Standard => &STANDARD,
            BlobMode::Leviathan => &LEVIATHAN,
            BlobMode::Molten => &MOLTEN,
            BlobMode::Bioluminescent => &BIOLUMINESCENT,
            BlobMode::Swarm => &SWARM,
        }
    }
}

impl fmt::Display for BlobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlobMode {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        BlobMode::ALL
            .into_iter()
            .find(|m| m.name() == key || m.label() == key)
            .ok_or_else(|| BackdropError::UnknownMode(s.to_string()))
    }
}

/// Per-mode population and visual tuning. Immutable for the process lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeConfiguration {
    pub mode: BlobMode,
    /// Entities spawned as the initial, centrally placed batch.
    pub baseline_count: usize,
    /// Target number of simultaneously live entities.
    pub population_count: usize,
    /// Hard upper bound on retained entities.
    pub pool_capacity: usize,
    pub scale_range: (f32, f32),
    pub speed_range: (f32, f32),
    /// `0xRRGGBB` colours; never empty.
    pub palette: &'static [u32],
    pub morph_intensity: f32,
    pub morph_speed: f32,
    pub geometry: GeometryKind,
    /// Adds a gentle upward drift.
    pub buoyant: bool,
}

static STANDARD: ModeConfiguration = ModeConfiguration {
    mode: BlobMode::Standard,
    baseline_count: 7,
    population_count: 14,
    pool_capacity: 17,
    scale_range: (1.8, 3.8),
    speed_range: (0.04, 0.12),
    palette: &[0x22C55E, 0x16A34A, 0x15803D, 0x166534, 0x14532D],
    morph_intensity: 0.2,
    morph_speed: 0.16,
    geometry: GeometryKind::Sphere { segments: 48 },
    buoyant: true,
};

static LEVIATHAN: ModeConfiguration = ModeConfiguration {
    mode: BlobMode::Leviathan,
    baseline_count: 3,
    population_count: 10,
    pool_capacity: 12,
    scale_range: (5.0, 7.5),
    speed_range: (0.01, 0.06),
    palette: &[0x16A34A, 0x15803D, 0x166534, 0x14532D, 0x0F5132],
    morph_intensity: 0.05,
    morph_speed: 0.1,
    geometry: GeometryKind::Sphere { segments: 60 },
    buoyant: false,
};

static MOLTEN: ModeConfiguration = ModeConfiguration {
    mode: BlobMode::Molten,
    baseline_count: 6,
    population_count: 13,
    pool_capacity: 16,
    scale_range: (2.2, 4.2),
    speed_range: (0.07, 0.18),
    palette: &[0xF97316, 0xEA580C, 0xC2410C, 0x9A3412, 0x7C2D12],
    morph_intensity: 0.35,
    morph_speed: 0.3,
    geometry: GeometryKind::Icosahedron { detail: 5 },
    buoyant: true,
};

static BIOLUMINESCENT: ModeConfiguration = ModeConfiguration {
    mode: BlobMode::Bioluminescent,
    baseline_count: 9,
    population_count: 16,
    pool_capacity: 20,
    scale_range: (1.0, 3.0),
    speed_range: (0.18, 0.45),
    palette: &[0x22C55E, 0x16A34A, 0xF97316, 0xFFFFFF, 0xE5E7EB, 0x10B981],
    morph_intensity: 0.16,
    morph_speed: 0.6,
    geometry: GeometryKind::Icosahedron { detail: 7 },
    buoyant: false,
};

static SWARM: ModeConfiguration = ModeConfiguration {
    mode: BlobMode::Swarm,
    baseline_count: 20,
    population_count: 27,
    pool_capacity: 32,
    scale_range: (0.25, 0.9),
    speed_range: (0.6, 1.4),
    palette: &[0x22C55E, 0x16A34A, 0xF97316, 0xEA580C, 0xFFFFFF, 0xE5E7EB],
    morph_intensity: 0.08,
    morph_speed: 1.2,
    geometry: GeometryKind::Sphere { segments: 48 },
    buoyant: true,
};

/// Lookup over the closed set of modes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModeCatalog;

impl ModeCatalog {
    /// Resolve a canonical name or presentation label.
    pub fn resolve(mode_id: &str) -> Result<&'static ModeConfiguration, BackdropError> {
        mode_id.parse::<BlobMode>().map(BlobMode::config)
    }

    pub fn iter() -> impl Iterator<Item = &'static ModeConfiguration> {
        BlobMode::ALL.into_iter().map(BlobMode::config)
    }
}
