use crate::constants::{
    FLAPPY_ANIMATION_TIME, FLAPPY_ASCENT_SNAP, FLAPPY_BIRD_HEIGHT, FLAPPY_BIRD_X, FLAPPY_BIRD_Y,
    FLAPPY_CEILING, FLAPPY_FLOOR_SLACK, FLAPPY_GLIDE_TILT, FLAPPY_GRAVITY, FLAPPY_JUMP_VELOCITY,
    FLAPPY_LAUNCH_MARGIN, FLAPPY_MAX_TILT, FLAPPY_MIN_TILT, FLAPPY_TERMINAL_FALL,
    FLAPPY_TILT_DECAY,
};

/// Wing frames shown over one flap, each held for [FLAPPY_ANIMATION_TIME] ticks
const FLAP_CYCLE: [usize; 4] = [0, 1, 2, 1];

/// A bird's kinematic state. `x` never changes; the world scrolls past instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    x: f64,
    y: f64,
    velocity: f64,
    /// Ticks since the last jump
    ticks: u32,
    /// y at the last jump
    launch: f64,
    tilt: f64,
    img_count: usize,
    frame: usize,
}

impl Default for Bird {
    fn default() -> Self {
        Self::new(FLAPPY_BIRD_X, FLAPPY_BIRD_Y)
    }
}

impl Bird {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            velocity: 0.,
            ticks: 0,
            launch: y,
            tilt: 0.,
            img_count: 0,
            frame: 0,
        }
    }

    pub fn jump(&mut self) {
        self.velocity = FLAPPY_JUMP_VELOCITY;
        self.ticks = 0;
        self.launch = self.y;
    }

    /// Move one tick along the jump arc, returning the displacement applied
    pub fn advance_tick(&mut self) -> f64 {
        self.ticks += 1;
        let t = f64::from(self.ticks);
        let mut d = self.velocity * t + 0.5 * FLAPPY_GRAVITY * t * t;
        if d >= FLAPPY_TERMINAL_FALL {
            d = FLAPPY_TERMINAL_FALL;
        }
        if d < 0. {
            d -= FLAPPY_ASCENT_SNAP;
        }
        self.y += d;

        if d < 0. || self.y < self.launch + FLAPPY_LAUNCH_MARGIN {
            self.tilt = self.tilt.max(FLAPPY_MAX_TILT);
        } else {
            self.tilt = (self.tilt - FLAPPY_TILT_DECAY).max(FLAPPY_MIN_TILT);
        }
        d
    }

    /// Advance the wing flap by one tick. A bird diving steeply holds its wings level.
    pub fn animate(&mut self) {
        self.img_count += 1;
        if self.img_count > FLAPPY_ANIMATION_TIME * FLAP_CYCLE.len() {
            self.img_count = 0;
            self.frame = FLAP_CYCLE[0];
        } else {
            self.frame = FLAP_CYCLE[(self.img_count - 1) / FLAPPY_ANIMATION_TIME];
        }

        if self.tilt <= FLAPPY_GLIDE_TILT {
            self.frame = 1;
            self.img_count = FLAPPY_ANIMATION_TIME * 2;
        }
    }

    /// Whether the bird has hit the ground at `floor` or flown off the top
    #[inline]
    pub fn bounds_violated(&self, floor: f64) -> bool {
        self.y + FLAPPY_BIRD_HEIGHT as f64 - FLAPPY_FLOOR_SLACK >= floor || self.y < FLAPPY_CEILING
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }
}
