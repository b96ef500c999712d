pub const DEFAULT_GRAVITY: f32 = 9.8;
pub const DEFAULT_FRICTION: f32 = 0.9;
pub const DEFAULT_TIME_STEP: f32 = 0.001;
pub const DEFAULT_SPATIAL_STEP: f32 = 0.2;
pub const DEFAULT_RESTITUTION: f32 = 1.0;
pub const DEFAULT_GRID_SIZE: usize = 660;

/// Peak height of the seeded Gaussian pulse.
pub const DEFAULT_PULSE_HEIGHT: f32 = 15.0;

/// The pulse spread is `min(size_x, size_y) / PULSE_SPREAD_DIVISOR`.
pub const PULSE_SPREAD_DIVISOR: f32 = 8.0;

/// Upper bound on simulation ticks executed in a single frame.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 250;

/// Still-water depth used by the CPU reference kernel. Cell heights are
/// measured relative to this level.
pub const DEFAULT_REST_DEPTH: f32 = 10.0;
pub const DEFAULT_MIN_DEPTH: f32 = 1e-3;

pub const GRID_ALLOCATION_ERROR: &str = "Failed to allocate simulation grids";

/// Frame loop rate of the headless simulator.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Ticks between two frame dumps.
pub const DEFAULT_DUMP_EVERY: u64 = 100;

pub const CONFIG_LOAD_ERROR: &str = "Failed to load simulation configuration";
pub const DUMP_DIR_ERROR: &str = "Could not create frame dump directory";
