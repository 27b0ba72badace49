// Shared layout, camera and interaction tuning constants used by both web and native frontends.

// Sphere layout
pub const SPHERE_RADIUS: f32 = 2.0; // world-space radius tiles sit on
pub const MIN_ANCHORS: usize = 42; // icosphere level 1; smaller lists repeat around the sphere
pub const MAX_MIN_ANCHORS: usize = 40_962; // icosphere level 6; upper bound for configured padding
pub const TILE_FILL: f32 = 0.82; // fraction of the half-separation a tile may occupy

// Camera
pub const FOVY_RADIANS: f32 = std::f32::consts::FRAC_PI_3;
pub const ZNEAR: f32 = 0.05;
pub const ZFAR: f32 = 10.0;
pub const ZOOM_FOV_PER_SPEED: f32 = 0.06; // extra radians of fov per rad/s of angular speed
pub const ZOOM_FOV_MAX_EXTRA: f32 = 0.35;
pub const ZOOM_TAU_SEC: f32 = 0.18; // fov smoothing time constant

// Interaction
pub const DRAG_SENSITIVITY: f32 = 0.005; // radians per css pixel of pointer travel
pub const TAP_SLOP_PX: f32 = 4.0; // travel below this on release counts as a tap
pub const INERTIA_RETAIN_PER_SEC: f32 = 0.05; // fraction of angular velocity kept after one second
pub const SETTLE_EPSILON: f32 = 0.01; // rad/s below which inertia stops
pub const RELEASE_VELOCITY_TAU_SEC: f32 = 0.05; // smoothing of drag velocity handed to inertia
pub const MAX_ANGULAR_SPEED: f32 = 30.0; // rad/s clamp on flings

// Rendering
pub const EMPHASIS_START_DOT: f32 = 0.9; // anchors closer than this to forward start to grow
pub const EMPHASIS_SCALE: f32 = 0.25; // extra scale at full emphasis
pub const PLACEHOLDER_RGBA: [u8; 4] = [38, 42, 56, 255];
pub const CLEAR_COLOR: [f64; 4] = [0.02, 0.02, 0.04, 1.0];

// Frame timing
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // clamp after tab switches / long stalls
