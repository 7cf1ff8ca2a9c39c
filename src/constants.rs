//! Centralized constants for the game simulation and the evolution engine.
//!
//! Everything here is a fixed law of the game or a tuning value that is not exposed through
//! [crate::config::Config]. All names carry the `FLAPPY_` prefix.

// ============================================================================
// Playfield
// ============================================================================

/// Width of the playfield, and the x at which freshly spawned pipes appear
pub const FLAPPY_WIN_WIDTH: f64 = 600.0;

/// Height of the playfield
pub const FLAPPY_WIN_HEIGHT: f64 = 800.0;

/// y of the ground strip's top edge
pub const FLAPPY_FLOOR: f64 = 730.0;

/// Birds above this y have flown off the top of the playfield
pub const FLAPPY_CEILING: f64 = -50.0;

/// How far a bird's sprite may sink into the ground before it counts as grounded
pub const FLAPPY_FLOOR_SLACK: f64 = 10.0;

// ============================================================================
// Bird
// ============================================================================

/// Fixed x of every bird; the world scrolls instead
pub const FLAPPY_BIRD_X: f64 = 230.0;

/// y at which birds spawn
pub const FLAPPY_BIRD_Y: f64 = 350.0;

/// Sprite size of the bird, in playfield units
pub const FLAPPY_BIRD_WIDTH: usize = 68;
pub const FLAPPY_BIRD_HEIGHT: usize = 48;

/// Velocity set by a jump (negative is up)
pub const FLAPPY_JUMP_VELOCITY: f64 = -10.5;

/// Acceleration term of the per-tick displacement law `v·t + ½·a·t²`
pub const FLAPPY_GRAVITY: f64 = 3.0;

/// Largest downward displacement in a single tick
pub const FLAPPY_TERMINAL_FALL: f64 = 16.0;

/// Extra lift applied every tick the bird is still ascending
pub const FLAPPY_ASCENT_SNAP: f64 = 2.0;

/// Birds keep their nose up until they sink this far below their launch height
pub const FLAPPY_LAUNCH_MARGIN: f64 = 50.0;

/// Tilt bounds and decay, in degrees
pub const FLAPPY_MAX_TILT: f64 = 25.0;
pub const FLAPPY_MIN_TILT: f64 = -90.0;
pub const FLAPPY_TILT_DECAY: f64 = 20.0;

/// At or below this tilt the bird glides with its wings level
pub const FLAPPY_GLIDE_TILT: f64 = -80.0;

/// Ticks each wing frame is shown for
pub const FLAPPY_ANIMATION_TIME: usize = 5;

// ============================================================================
// Pipes and ground
// ============================================================================

/// Sprite size of a single pipe, in playfield units
pub const FLAPPY_PIPE_WIDTH: usize = 104;
pub const FLAPPY_PIPE_HEIGHT: usize = 640;

/// Vertical opening between the top and bottom pipe
pub const FLAPPY_PIPE_GAP: f64 = 200.0;

/// Range the gap's top edge is drawn from, upper bound exclusive
pub const FLAPPY_PIPE_MIN_HEIGHT: i32 = 50;
pub const FLAPPY_PIPE_MAX_HEIGHT: i32 = 450;

/// x of the first pipe of every round
pub const FLAPPY_PIPE_START_X: f64 = 700.0;

/// Horizontal scroll speed of pipes and ground, per tick
pub const FLAPPY_SCROLL_SPEED: f64 = 5.0;

/// Width of one ground tile
pub const FLAPPY_BASE_WIDTH: f64 = 672.0;

// ============================================================================
// Fitness shaping
// ============================================================================

/// Reward for every tick an agent stays alive
pub const FLAPPY_SURVIVAL_REWARD: f64 = 0.1;

/// Reward shared by every live agent whenever the lead bird clears a pipe
pub const FLAPPY_PASS_REWARD: f64 = 5.0;

/// Penalty for flying into a pipe
pub const FLAPPY_COLLISION_PENALTY: f64 = -1.0;

/// Network output above which the bird jumps
pub const FLAPPY_JUMP_THRESHOLD: f64 = 0.5;

/// Observation size (altitude, distance to gap top, distance to gap bottom) and decision size
pub const FLAPPY_SENSORY: usize = 3;
pub const FLAPPY_ACTION: usize = 1;

// ============================================================================
// Connection Mutation Parameters
// ============================================================================

/// Standard deviation of freshly drawn weights
pub const FLAPPY_WEIGHT_INIT_STDEV: f64 = 1.0;

/// Standard deviation of a weight perturbation
pub const FLAPPY_WEIGHT_PERTURB_POWER: f64 = 0.5;

/// Weights are clamped into this range after every mutation
pub const FLAPPY_WEIGHT_MIN: f64 = -30.0;
pub const FLAPPY_WEIGHT_MAX: f64 = 30.0;

/// Probability of keeping a gene disabled in a child when either parent has it disabled
pub const FLAPPY_CROSSOVER_KEEP_DISABLED: f64 = 0.75;

/// Probability of taking a matching gene from the less fit parent
pub const FLAPPY_CROSSOVER_PICK_LESSER: f64 = 0.5;

// ============================================================================
// Crossover Coefficients
// ============================================================================

/// Coefficient for excess genes in compatibility distance calculation
pub const FLAPPY_EXCESS_COEFFICIENT: f64 = 1.0;

/// Coefficient for disjoint genes in compatibility distance calculation
pub const FLAPPY_DISJOINT_COEFFICIENT: f64 = 1.0;

/// Coefficient for parameter differences in compatibility distance calculation
pub const FLAPPY_PARAM_COEFFICIENT: f64 = 0.5;

/// Genome size threshold for normalization in delta calculation
pub const FLAPPY_NORMALIZATION_THRESHOLD: f64 = 20.0;

// ============================================================================
// Reproduction Parameters
// ============================================================================

/// Ratio of offspring from mutation without crossover (1/4 = 0.25)
pub const FLAPPY_REPRODUCTION_COPY_RATIO: usize = 4;
