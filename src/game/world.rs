use super::{mask::Sprites, Base, Bird, Pipe};
use crate::constants::{FLAPPY_FLOOR, FLAPPY_PIPE_START_X, FLAPPY_PIPE_WIDTH, FLAPPY_WIN_WIDTH};
use rand::{rngs::StdRng, SeedableRng};
use slotmap::{Key, SlotMap};
use tracing::debug;

/// Anything flying through a [World], carrying a [Bird]
pub trait Flier {
    fn bird(&self) -> &Bird;
    fn bird_mut(&mut self) -> &mut Bird;
}

impl Flier for Bird {
    #[inline]
    fn bird(&self) -> &Bird {
        self
    }

    #[inline]
    fn bird_mut(&mut self) -> &mut Bird {
        self
    }
}

/// What happened to a flock over one [World::step]. Removed fliers are moved out of the
/// flock and into here.
#[derive(Debug)]
pub struct Tick<K, F> {
    pub collided: Vec<(K, F)>,
    pub out_of_bounds: Vec<(K, F)>,
    /// Whether the lead bird cleared a pipe, scoring a point
    pub passed: bool,
}

/// Pipes, ground and score. Birds live in the caller's flock and are moved by the caller
/// before every [World::step].
#[derive(Debug, Clone)]
pub struct World {
    pipes: Vec<Pipe>,
    base: Base,
    score: usize,
    rng: StdRng,
    sprites: Sprites,
}

impl World {
    /// A world with a single random pipe at the round's starting x
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let first = Pipe::new(FLAPPY_PIPE_START_X, &mut rng);
        Self::with_pipes(vec![first], rng)
    }

    /// A world with some known pipes. Pipes spawned later are drawn from `rng`.
    pub fn with_pipes(pipes: Vec<Pipe>, rng: StdRng) -> Self {
        Self {
            pipes,
            base: Base::new(FLAPPY_FLOOR),
            score: 0,
            rng,
            sprites: Sprites::default(),
        }
    }

    #[inline]
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    #[inline]
    pub fn base(&self) -> &Base {
        &self.base
    }

    #[inline]
    pub fn score(&self) -> usize {
        self.score
    }

    #[inline]
    pub fn sprites(&self) -> &Sprites {
        &self.sprites
    }

    /// Index of the pipe a bird at `lead_x` should be aiming for: the first, unless it is
    /// already behind the bird and a second one exists
    pub fn target_pipe(&self, lead_x: f64) -> Option<usize> {
        match self.pipes.as_slice() {
            [] => None,
            [first, _, ..] if lead_x > first.x() + FLAPPY_PIPE_WIDTH as f64 => Some(1),
            _ => Some(0),
        }
    }

    /// Scroll the world by one tick against an already moved flock. Colliding fliers are
    /// removed first, then the lead flier is checked for a pass, scoring at most one point
    /// and spawning at most one pipe per tick. Fliers out of bounds are removed last.
    pub fn step<K: Key, F: Flier>(&mut self, flock: &mut SlotMap<K, F>) -> Tick<K, F> {
        let mut collided = vec![];
        let mut passed = false;

        for pipe in self.pipes.iter_mut() {
            pipe.advance_tick();

            let hits = flock
                .iter()
                .filter(|(_, f)| pipe.collides_with(f.bird(), &self.sprites))
                .map(|(k, _)| k)
                .collect::<Vec<_>>();
            for k in hits {
                if let Some(f) = flock.remove(k) {
                    debug!(key = ?k, x = pipe.x(), "collided");
                    collided.push((k, f));
                }
            }

            if let Some((_, lead)) = flock.iter().next() {
                passed |= pipe.try_pass(lead.bird().x());
            }
        }

        if passed {
            self.score += 1;
            let pipe = Pipe::new(FLAPPY_WIN_WIDTH, &mut self.rng);
            debug!(score = self.score, height = pipe.height(), "pipe passed, spawning");
            self.pipes.push(pipe);
        }

        self.pipes.retain(|p| !p.off_screen());

        let strays = flock
            .iter()
            .filter(|(_, f)| f.bird().bounds_violated(FLAPPY_FLOOR))
            .map(|(k, _)| k)
            .collect::<Vec<_>>();
        let out_of_bounds = strays
            .into_iter()
            .filter_map(|k| flock.remove(k).map(|f| (k, f)))
            .collect();

        self.base.advance_tick();
        for (_, f) in flock.iter_mut() {
            f.bird_mut().animate();
        }

        Tick {
            collided,
            out_of_bounds,
            passed,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::DefaultKey;

    fn flock(birds: impl IntoIterator<Item = Bird>) -> SlotMap<DefaultKey, Bird> {
        let mut flock = SlotMap::new();
        for b in birds {
            flock.insert(b);
        }
        flock
    }

    fn world(pipes: Vec<Pipe>) -> World {
        World::with_pipes(pipes, StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_new_world() {
        let w = World::new(7);
        assert_eq!(w.pipes().len(), 1);
        assert_eq!(w.pipes()[0].x(), FLAPPY_PIPE_START_X);
        assert_eq!(w.score(), 0);
        assert_eq!(World::new(7).pipes(), w.pipes());
    }

    #[test]
    fn test_target_pipe() {
        assert_eq!(world(vec![]).target_pipe(230.), None);

        let w = world(vec![Pipe::with_height(100., 200.)]);
        assert_eq!(w.target_pipe(230.), Some(0));

        let w = world(vec![
            Pipe::with_height(120., 200.),
            Pipe::with_height(600., 200.),
        ]);
        assert_eq!(w.target_pipe(230.), Some(1));
        assert_eq!(w.target_pipe(224.), Some(0));
    }

    #[test]
    fn test_pass_scores_once_and_spawns_once() {
        // hovering in the gap
        let mut w = world(vec![Pipe::with_height(240., 300.)]);
        let mut birds = flock([Bird::new(230., 380.), Bird::new(230., 380.)]);

        let mut passes = 0;
        for _ in 0..5 {
            let tick = w.step(&mut birds);
            assert!(tick.collided.is_empty() && tick.out_of_bounds.is_empty());
            if tick.passed {
                passes += 1;
                assert_eq!(w.pipes().len(), 2);
                assert_eq!(w.pipes()[1].x(), FLAPPY_WIN_WIDTH);
            }
        }
        assert_eq!(passes, 1);
        assert_eq!(w.score(), 1);
        assert_eq!(w.pipes().len(), 2);
    }

    #[test]
    fn test_collision_removes_and_blocks_pass() {
        let mut w = world(vec![Pipe::with_height(235., 300.)]);
        let mut birds = flock([Bird::new(230., 600.)]);
        let tick = w.step(&mut birds);

        assert_eq!(tick.collided.len(), 1);
        assert!(!tick.passed);
        assert!(birds.is_empty());
        assert_eq!(w.score(), 0);
        assert!(!w.pipes()[0].passed());
    }

    #[test]
    fn test_out_of_bounds_after_pass() {
        // a gap high enough for both birds to clear the pipe
        let mut w = world(vec![Pipe::with_height(230., -100.)]);
        let mut birds = flock([Bird::new(230., 0.), Bird::new(230., -60.)]);
        let tick = w.step(&mut birds);

        assert!(tick.passed);
        assert!(tick.collided.is_empty());
        assert_eq!(tick.out_of_bounds.len(), 1);
        assert_eq!(tick.out_of_bounds[0].1.y(), -60.);
        assert_eq!(birds.len(), 1);
    }

    #[test]
    fn test_empty_flock_never_passes() {
        let mut w = world(vec![Pipe::with_height(230., 300.)]);
        let mut birds = flock([]);
        assert!(!w.step(&mut birds).passed);
        assert_eq!(w.score(), 0);
        assert_eq!(w.pipes().len(), 1);
    }

    #[test]
    fn test_pipe_despawns() {
        let mut w = world(vec![Pipe::with_height(0., 300.)]);
        let mut birds = flock([]);
        for _ in 0..20 {
            w.step(&mut birds);
        }
        assert_eq!(w.pipes().len(), 1);
        w.step(&mut birds);
        assert!(w.pipes().is_empty());
    }
}
