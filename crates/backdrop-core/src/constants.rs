// Shared tuning constants for the lava background.

// Lifecycle timing (milliseconds)
pub const SWEEP_INTERVAL_MS: u64 = 3_500; // lifecycle sweep period, independent of frame rate
pub const INACTIVITY_THRESHOLD_MS: u64 = 7_000; // idle time before a visible blob fades out
pub const INITIAL_DELAY_MS: u64 = 200; // first batch appears almost immediately
pub const ARRIVAL_DELAY_MIN_MS: u64 = 5_000; // staggered arrivals wait 5..6 s
pub const ARRIVAL_DELAY_MAX_MS: u64 = 6_000;

// Opacity thresholds
pub const FADED_OPACITY: f32 = 0.01; // below this a fading blob counts as gone
pub const VISIBLE_OPACITY: f32 = 0.005; // below this the renderer hides the mesh

// Scale floor so meshes never collapse to a point
pub const MIN_SCALE: f32 = 0.01;

// Spawn layout
pub const SPAWN_EDGE_FACTOR: f32 = 1.1; // arrivals start slightly outside the view
pub const SPAWN_DEPTH_RADIUS: f32 = 8.0;
pub const SPAWN_ARRIVAL_SPREAD: f32 = 7.0; // arrival angles are spread over this many slots
pub const SPAWN_CENTER_FRACTION: f32 = 0.3; // initial members sit in the central 30% of the view
pub const SPAWN_EDGE_JITTER_FRACTION: f32 = 0.4;
pub const SPAWN_DEPTH_SPAN: f32 = 10.0;
pub const SPAWN_DEPTH_BIAS: f32 = -5.0;
pub const SPEED_JITTER: f32 = 0.15; // +-7.5%
pub const MORPH_JITTER: f32 = 0.25;
pub const TIME_OFFSET_MAX: f32 = 2_000.0;

// Motion integration
pub const MAX_FRAME_STEP_SEC: f32 = 0.033;
pub const PHASE_RATE: f32 = 0.45;
pub const NOISE_TIME_RATE: f32 = 0.18;
pub const MOVEMENT_NOISE_SCALE: f32 = 0.035;
pub const FORCE_GAIN: f32 = 25.0;
pub const BUOYANCY_BASE: f32 = 0.7;
pub const BUOYANCY_SPAN: f32 = 0.6;
pub const REPULSION_MIN_DISTANCE: f32 = 0.01;
pub const REPULSION_FALLOFF_EXP: f32 = 1.8;
pub const REPULSION_GAIN: f32 = 0.08;
pub const REPULSION_INTENSITY_SHARE: f32 = 0.6;
pub const VELOCITY_DAMPING_PER_SEC: f32 = 0.8;
pub const BOUNDARY_PADDING: f32 = 0.65;
pub const BOUNDARY_PUSH: f32 = 0.05;
pub const DEPTH_MAX: f32 = 6.0;
pub const DEPTH_MIN: f32 = -12.0;
pub const LERP_RATE: f32 = 0.35;
pub const OPACITY_LERP_BOOST: f32 = 1.2;
pub const REPULSION_DECAY_BOOST: f32 = 1.8;
pub const VIEW_MARGIN: f32 = 1.15; // bounding sphere inflation for the frustum test
pub const REFERENCE_FPS: f32 = 60.0; // impulses are tuned per 60 Hz frame

// Deformation
pub const MORPH_TIME_RATE: f32 = 0.65;
pub const MORPH_REPULSION_GAIN: f32 = 1.5;
pub const MORPH_RADIAL_BASE: f32 = 0.58;
pub const MORPH_RADIAL_SPAN: f32 = 0.42;
pub const MORPH_RADIAL_FREQ: f32 = 1.45;
pub const MORPH_SAMPLING: f32 = 1.45;
pub const MORPH_DRIFT: [f32; 3] = [0.18, 0.22, 0.28];

// Camera
pub const CAMERA_Z: f32 = 25.0;
pub const CAMERA_FOV_DEG: f32 = 55.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1_000.0;
pub const CAMERA_DRIFT_PER_FRAME: f32 = 0.000_07; // slow azimuth orbit
