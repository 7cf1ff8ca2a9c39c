use crate::constants::{FLAPPY_BASE_WIDTH, FLAPPY_SCROLL_SPEED};

/// The ground: two tiles scrolling left, each jumping behind the other once fully off-screen
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    y: f64,
    x1: f64,
    x2: f64,
}

impl Base {
    pub fn new(y: f64) -> Self {
        Self {
            y,
            x1: 0.,
            x2: FLAPPY_BASE_WIDTH,
        }
    }

    pub fn advance_tick(&mut self) {
        self.x1 -= FLAPPY_SCROLL_SPEED;
        self.x2 -= FLAPPY_SCROLL_SPEED;
        if self.x1 + FLAPPY_BASE_WIDTH < 0. {
            self.x1 = self.x2 + FLAPPY_BASE_WIDTH;
        }
        if self.x2 + FLAPPY_BASE_WIDTH < 0. {
            self.x2 = self.x1 + FLAPPY_BASE_WIDTH;
        }
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// x of both tiles
    #[inline]
    pub fn tiles(&self) -> [f64; 2] {
        [self.x1, self.x2]
    }
}
