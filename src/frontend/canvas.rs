//! Rasterizes scenes onto a grid of characters, scaled down from playfield units.

use super::Scene;
use crate::constants::{
    FLAPPY_BASE_WIDTH, FLAPPY_BIRD_HEIGHT, FLAPPY_BIRD_WIDTH, FLAPPY_FLOOR, FLAPPY_PIPE_WIDTH,
    FLAPPY_WIN_HEIGHT, FLAPPY_WIN_WIDTH,
};

const SKY: char = ' ';
const PIPE: char = '#';
const GROUND: char = '=';
const SEAM: char = '|';
const SIGHT: char = '.';
/// Bird glyph per wing frame
const BIRD: [char; 3] = ['v', '-', '^'];

#[derive(Debug, Clone)]
pub struct Canvas {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        let (cols, rows) = (cols.max(1), rows.max(1));
        Self {
            cols,
            rows,
            cells: vec![SKY; cols * rows],
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn clear(&mut self) {
        self.cells.fill(SKY);
    }

    pub fn row(&self, r: usize) -> String {
        self.cells[r * self.cols..(r + 1) * self.cols].iter().collect()
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.rows).map(|r| self.row(r))
    }

    fn col_of(&self, x: f64) -> i64 {
        (x * self.cols as f64 / FLAPPY_WIN_WIDTH).floor() as i64
    }

    fn row_of(&self, y: f64) -> i64 {
        (y * self.rows as f64 / FLAPPY_WIN_HEIGHT).floor() as i64
    }

    fn set(&mut self, col: i64, row: i64, c: char) {
        if (0..self.cols as i64).contains(&col) && (0..self.rows as i64).contains(&row) {
            self.cells[row as usize * self.cols + col as usize] = c;
        }
    }

    /// Fill the playfield rectangle `[x0, x1) × [y0, y1)`
    fn fill(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), c: char) {
        let (c0, c1) = (self.col_of(x0), self.col_of(x1 - 1.));
        let (r0, r1) = (self.row_of(y0), self.row_of(y1 - 1.));
        for row in r0.max(0)..=r1.min(self.rows as i64 - 1) {
            for col in c0.max(0)..=c1.min(self.cols as i64 - 1) {
                self.set(col, row, c);
            }
        }
    }

    fn line(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), c: char) {
        let cell_w = FLAPPY_WIN_WIDTH / self.cols as f64;
        let cell_h = FLAPPY_WIN_HEIGHT / self.rows as f64;
        let steps = ((x1 - x0).abs() / cell_w)
            .max((y1 - y0).abs() / cell_h)
            .ceil()
            .max(1.) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let (x, y) = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            self.set(self.col_of(x), self.row_of(y), c);
        }
    }

    /// Write text starting at a cell, clipped to the canvas
    fn text(&mut self, col: i64, row: i64, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            self.set(col + i as i64, row, ch);
        }
    }

    fn centered(&mut self, y: f64, s: &str) {
        let col = (self.cols as i64 - s.chars().count() as i64) / 2;
        let row = self.row_of(y);
        self.text(col, row, s);
    }

    pub fn render_scene(&mut self, scene: &Scene) {
        self.clear();
        let world = scene.world;

        for pipe in world.pipes() {
            let x1 = pipe.x() + FLAPPY_PIPE_WIDTH as f64;
            self.fill((pipe.x(), pipe.top()), (x1, pipe.height()), PIPE);
            self.fill((pipe.x(), pipe.bottom()), (x1, world.base().y()), PIPE);
        }
        let ground = world.base().y();
        for x in world.base().tiles() {
            self.fill((x, ground), (x + FLAPPY_BASE_WIDTH, FLAPPY_WIN_HEIGHT), GROUND);
            // tile seams make the scrolling visible
            self.set(self.col_of(x), self.row_of(ground), SEAM);
        }

        let half_w = FLAPPY_BIRD_WIDTH as f64 / 2.;
        let half_h = FLAPPY_BIRD_HEIGHT as f64 / 2.;
        if scene.sight_lines {
            // the target may already have scrolled away
            if let Some(pipe) = scene.target.and_then(|idx| world.pipes().get(idx)) {
                let mid = pipe.x() + FLAPPY_PIPE_WIDTH as f64 / 2.;
                for bird in scene.birds.iter() {
                    let eye = (bird.x() + half_w, bird.y() + half_h);
                    self.line(eye, (mid, pipe.height()), SIGHT);
                    self.line(eye, (mid, pipe.bottom()), SIGHT);
                }
            }
        }

        for bird in scene.birds.iter() {
            let glyph = BIRD[bird.frame().min(BIRD.len() - 1)];
            let (col, row) = (
                self.col_of(bird.x() + half_w),
                self.row_of(bird.y() + half_h),
            );
            self.set(col, row, glyph);
        }

        let score = format!("Score: {}", world.score());
        self.text(self.cols as i64 - score.len() as i64 - 1, 0, &score);
        if let Some(generation) = scene.generation {
            self.text(1, 0, &format!("Gens: {generation}"));
            self.text(1, 1, &format!("Alive: {}", scene.alive()));
        }
    }

    pub fn render_menu(&mut self) {
        self.clear();
        self.fill((0., FLAPPY_FLOOR), (FLAPPY_WIN_WIDTH, FLAPPY_WIN_HEIGHT), GROUND);
        self.centered(200., "Flappy Bird");
        self.centered(400., "Press 1 to Play");
        self.centered(500., "Press 2 for AI");
    }

    /// Overlay the pause menu on whatever was drawn last
    pub fn render_paused(&mut self) {
        self.centered(300., "Paused");
        self.centered(400., "Press R to Resume");
        self.centered(500., "Press M for Main Menu");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::{Bird, Pipe, World};
    use rand::{rngs::StdRng, SeedableRng};

    fn scene<'a>(world: &'a World, birds: Vec<&'a Bird>, sight_lines: bool) -> Scene<'a> {
        Scene {
            world,
            birds,
            generation: Some(3),
            target: Some(0),
            sight_lines,
        }
    }

    #[test]
    fn test_render_scene() {
        let world = World::with_pipes(vec![Pipe::with_height(300., 200.)], StdRng::seed_from_u64(0));
        let bird = Bird::new(230., 350.);
        let mut canvas = Canvas::new(60, 80);
        canvas.render_scene(&scene(&world, vec![&bird], false));

        let lines = canvas.lines().collect::<Vec<_>>();
        assert!(lines[0].contains("Score: 0"));
        assert!(lines[0].contains("Gens: 3"));
        assert!(lines[1].contains("Alive: 1"));
        // top pipe above the gap, bottom pipe below it
        assert_eq!(lines[10].chars().nth(35), Some(PIPE));
        assert_eq!(lines[30].chars().nth(35), Some(SKY));
        assert_eq!(lines[50].chars().nth(35), Some(PIPE));
        assert!(lines[79].chars().all(|c| c == GROUND));
        // bird centre (264, 374)
        assert_eq!(lines[37].chars().nth(26), Some('v'));
        assert!(!canvas.cells.contains(&SIGHT));
    }

    #[test]
    fn test_sight_lines_skip_missing_target() {
        let world = World::with_pipes(vec![Pipe::with_height(400., 200.)], StdRng::seed_from_u64(0));
        let bird = Bird::new(230., 350.);
        let mut canvas = Canvas::new(60, 80);

        canvas.render_scene(&scene(&world, vec![&bird], true));
        assert!(canvas.cells.contains(&SIGHT));

        let mut gone = scene(&world, vec![&bird], true);
        gone.target = Some(4);
        canvas.render_scene(&gone);
        assert!(!canvas.cells.contains(&SIGHT));
    }

    #[test]
    fn test_menus() {
        let mut canvas = Canvas::new(40, 40);
        canvas.render_menu();
        let text = canvas.lines().collect::<Vec<_>>().join("\n");
        assert!(text.contains("Flappy Bird"));
        assert!(text.contains("Press 1 to Play"));
        assert!(text.contains("Press 2 for AI"));

        canvas.render_paused();
        let text = canvas.lines().collect::<Vec<_>>().join("\n");
        assert!(text.contains("Paused"));
        assert!(text.contains("Press M for Main Menu"));
        assert!(text.contains("Flappy Bird"));
    }

    #[test]
    fn test_tiny_canvas_does_not_panic() {
        let world = World::new(1);
        let bird = Bird::default();
        let mut canvas = Canvas::new(0, 0);
        canvas.render_scene(&scene(&world, vec![&bird], true));
        canvas.render_menu();
        canvas.render_paused();
        assert_eq!(canvas.lines().count(), 1);
    }
}
