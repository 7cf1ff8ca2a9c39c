use super::{mask::Sprites, Bird};
use crate::constants::{
    FLAPPY_PIPE_GAP, FLAPPY_PIPE_HEIGHT, FLAPPY_PIPE_MAX_HEIGHT, FLAPPY_PIPE_MIN_HEIGHT,
    FLAPPY_PIPE_WIDTH, FLAPPY_SCROLL_SPEED,
};
use rand::Rng;

/// A top and bottom pipe pair scrolling left, with a fixed gap between them
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    x: f64,
    /// y of the gap's top edge
    height: f64,
    passed: bool,
}

impl Pipe {
    /// A pipe whose gap height is drawn uniformly from its allowed range
    pub fn new(x: f64, rng: &mut impl Rng) -> Self {
        let height = rng.random_range(FLAPPY_PIPE_MIN_HEIGHT..FLAPPY_PIPE_MAX_HEIGHT);
        Self::with_height(x, f64::from(height))
    }

    pub fn with_height(x: f64, height: f64) -> Self {
        Self {
            x,
            height,
            passed: false,
        }
    }

    #[inline]
    pub fn advance_tick(&mut self) {
        self.x -= FLAPPY_SCROLL_SPEED;
    }

    /// Pixel-exact test of the bird's silhouette against both pipes
    pub fn collides_with(&self, bird: &Bird, sprites: &Sprites) -> bool {
        let dx = (self.x - bird.x()) as i32;
        let y = bird.y().round_ties_even();
        let top = (dx, (self.top() - y) as i32);
        let bottom = (dx, (self.bottom() - y) as i32);

        sprites.bird.overlap(&sprites.pipe_bottom, bottom).is_some()
            || sprites.bird.overlap(&sprites.pipe_top, top).is_some()
    }

    /// Flips the passed flag the first time the pipe scrolls behind `bird_x`. True only on
    /// that tick.
    pub fn try_pass(&mut self, bird_x: f64) -> bool {
        if !self.passed && self.x < bird_x {
            self.passed = true;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn off_screen(&self) -> bool {
        self.x + (FLAPPY_PIPE_WIDTH as f64) < 0.
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// y of the top pipe sprite's top edge
    #[inline]
    pub fn top(&self) -> f64 {
        self.height - FLAPPY_PIPE_HEIGHT as f64
    }

    /// y of the gap's bottom edge
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.height + FLAPPY_PIPE_GAP
    }

    #[inline]
    pub fn passed(&self) -> bool {
        self.passed
    }
}
