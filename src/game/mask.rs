//! Per-pixel silhouettes, used for collision instead of bounding boxes.

use crate::constants::{
    FLAPPY_BIRD_HEIGHT, FLAPPY_BIRD_WIDTH, FLAPPY_PIPE_HEIGHT, FLAPPY_PIPE_WIDTH,
};

/// Rows of a pipe taken up by its lip, which spans the full sprite width
const PIPE_LIP: usize = 48;

/// Columns on either side of the pipe shaft left empty by the wider lip
const PIPE_INSET: usize = 4;

/// A `width × height` grid of solid / empty pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn filled(width: usize, height: usize) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    /// The ellipse inscribed in a `width × height` box
    pub fn ellipse(width: usize, height: usize) -> Self {
        let (rx, ry) = (width as f64 / 2., height as f64 / 2.);
        Self::from_fn(width, height, |x, y| {
            let dx = (x as f64 + 0.5 - rx) / rx;
            let dy = (y as f64 + 0.5 - ry) / ry;
            dx * dx + dy * dy <= 1.
        })
    }

    pub fn flipped_vertical(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.get(x, self.height - 1 - y)
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    /// First solid pixel shared with `other` placed at `offset` relative to our top left
    /// corner, in our coordinates, scanning row by row
    pub fn overlap(&self, other: &Mask, (dx, dy): (i32, i32)) -> Option<(i32, i32)> {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + other.width as i32).min(self.width as i32);
        let y1 = (dy + other.height as i32).min(self.height as i32);

        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .find(|&(x, y)| {
                self.get(x as usize, y as usize) && other.get((x - dx) as usize, (y - dy) as usize)
            })
    }
}

/// Silhouettes of every sprite that takes part in collision
#[derive(Debug, Clone)]
pub struct Sprites {
    pub bird: Mask,
    pub pipe_top: Mask,
    pub pipe_bottom: Mask,
}

impl Default for Sprites {
    fn default() -> Self {
        let pipe_bottom = Mask::from_fn(FLAPPY_PIPE_WIDTH, FLAPPY_PIPE_HEIGHT, |x, y| {
            y < PIPE_LIP || (PIPE_INSET..FLAPPY_PIPE_WIDTH - PIPE_INSET).contains(&x)
        });
        Self {
            bird: Mask::ellipse(FLAPPY_BIRD_WIDTH, FLAPPY_BIRD_HEIGHT),
            pipe_top: pipe_bottom.flipped_vertical(),
            pipe_bottom,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_overlap_offsets() {
        let a = Mask::filled(4, 4);
        let b = Mask::filled(2, 2);
        assert_eq!(a.overlap(&b, (0, 0)), Some((0, 0)));
        assert_eq!(a.overlap(&b, (3, 3)), Some((3, 3)));
        assert_eq!(a.overlap(&b, (-1, -1)), Some((0, 0)));
        assert_eq!(a.overlap(&b, (4, 0)), None);
        assert_eq!(a.overlap(&b, (0, -2)), None);
        assert_eq!(a.overlap(&b, (-5, 1)), None);
    }

    #[test]
    fn test_ellipse_corners_are_empty() {
        let e = Mask::ellipse(68, 48);
        assert!(!e.get(0, 0));
        assert!(!e.get(67, 47));
        assert!(e.get(34, 24));
        assert!(e.get(0, 24));
        // corner to corner only
        assert_eq!(Mask::filled(2, 2).overlap(&e, (1, 1)), None);
    }

    #[test]
    fn test_flipped_vertical() {
        let m = Mask::from_fn(2, 3, |_, y| y == 0);
        let f = m.flipped_vertical();
        assert!(f.get(0, 2) && f.get(1, 2));
        assert!(!f.get(0, 0));
        assert_eq!(f.flipped_vertical(), m);
    }

    #[test]
    fn test_pipe_silhouette() {
        let sprites = Sprites::default();
        let bottom = &sprites.pipe_bottom;
        assert_eq!((bottom.width(), bottom.height()), (104, 640));
        assert!(bottom.get(0, 0));
        assert!(!bottom.get(0, 100));
        assert!(bottom.get(50, 639));
        assert!(sprites.pipe_top.get(0, 639));
        assert!(!sprites.pipe_top.get(0, 0));
    }
}
