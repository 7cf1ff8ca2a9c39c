//! Presentation seams. The simulation only ever talks to a [Renderer], an [Input] and a
//! [Pacer], bundled into a [Frontend] that is passed down explicitly.

pub mod canvas;
pub mod terminal;

use crate::{error::Result, game::Bird, game::World};
use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    Pause,
    Resume,
    Menu,
    Quit,
    Play,
    Train,
}

/// Where control goes when a round or training session is abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leave {
    Menu,
    Quit,
}

/// Everything a renderer needs to draw one frame
#[derive(Debug)]
pub struct Scene<'a> {
    pub world: &'a World,
    pub birds: Vec<&'a Bird>,
    /// Set while training
    pub generation: Option<usize>,
    /// Pipe the lead bird is aiming for, for sight lines
    pub target: Option<usize>,
    pub sight_lines: bool,
}

impl Scene<'_> {
    #[inline]
    pub fn alive(&self) -> usize {
        self.birds.len()
    }
}

pub trait Renderer {
    fn draw(&mut self, scene: &Scene) -> Result<()>;
    fn draw_menu(&mut self) -> Result<()>;
    fn draw_paused(&mut self) -> Result<()>;
}

pub trait Input {
    /// Every command that arrived since the last poll, without blocking
    fn poll(&mut self) -> Result<Vec<Command>>;
}

pub trait Pacer {
    /// Block until the next frame is due
    fn wait(&mut self);
}

/// Draws nothing, counting what it was asked to draw
#[derive(Debug, Default, Clone)]
pub struct NullRenderer {
    pub frames: usize,
    pub menus: usize,
    pub paused: usize,
}

impl Renderer for NullRenderer {
    fn draw(&mut self, _: &Scene) -> Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn draw_menu(&mut self) -> Result<()> {
        self.menus += 1;
        Ok(())
    }

    fn draw_paused(&mut self) -> Result<()> {
        self.paused += 1;
        Ok(())
    }
}

/// Never receives a command
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl Input for NoInput {
    fn poll(&mut self) -> Result<Vec<Command>> {
        Ok(vec![])
    }
}

/// Replays one list of commands per poll. Once the script runs out every poll yields the
/// fallback.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<Command>>,
    fallback: Vec<Command>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<Command>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            fallback: vec![],
        }
    }

    pub fn then(mut self, fallback: Vec<Command>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl Input for ScriptedInput {
    fn poll(&mut self) -> Result<Vec<Command>> {
        Ok(self
            .frames
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Sleeps away whatever is left of each frame
#[derive(Debug, Clone)]
pub struct FixedRate {
    period: Duration,
    last: Instant,
}

impl FixedRate {
    pub fn new(fps: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / fps.max(1),
            last: Instant::now(),
        }
    }
}

impl Pacer for FixedRate {
    fn wait(&mut self) {
        let elapsed = self.last.elapsed();
        if elapsed < self.period {
            thread::sleep(self.period - elapsed);
        }
        self.last = Instant::now();
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn wait(&mut self) {}
}

/// What the simulation should do with the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Run { jump: bool },
    Paused,
    Leave(Leave),
}

pub struct Frontend<R, I, P> {
    pub renderer: R,
    pub input: I,
    pub pacer: P,
    pub sight_lines: bool,
    paused: bool,
}

impl<R: Renderer, I: Input, P: Pacer> Frontend<R, I, P> {
    pub fn new(renderer: R, input: I, pacer: P) -> Self {
        Self {
            renderer,
            input,
            pacer,
            sight_lines: false,
            paused: false,
        }
    }

    pub fn with_sight_lines(mut self, sight_lines: bool) -> Self {
        self.sight_lines = sight_lines;
        self
    }

    #[inline]
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Wait for the next frame and interpret the commands that arrived. A pause takes effect
    /// from the following frame, and the frame a resume arrives on stays frozen. Only a paused
    /// session can be left for the menu; quitting works at any time.
    pub fn tick(&mut self) -> Result<Frame> {
        self.pacer.wait();
        let commands = self.input.poll()?;

        if self.paused {
            for c in commands {
                match c {
                    Command::Quit => return Ok(Frame::Leave(Leave::Quit)),
                    Command::Menu => {
                        self.paused = false;
                        return Ok(Frame::Leave(Leave::Menu));
                    }
                    Command::Resume => self.paused = false,
                    _ => {}
                }
            }
            if self.paused {
                self.renderer.draw_paused()?;
            }
            return Ok(Frame::Paused);
        }

        let mut jump = false;
        for c in commands {
            match c {
                Command::Quit => return Ok(Frame::Leave(Leave::Quit)),
                Command::Pause => self.paused = true,
                Command::Jump => jump = true,
                _ => {}
            }
        }
        Ok(Frame::Run { jump })
    }

    /// Show the main menu until a mode is picked or quit is requested. Returns one of
    /// [Command::Play], [Command::Train] or [Command::Quit].
    pub fn menu(&mut self) -> Result<Command> {
        loop {
            self.renderer.draw_menu()?;
            self.pacer.wait();
            for c in self.input.poll()? {
                if matches!(c, Command::Play | Command::Train | Command::Quit) {
                    return Ok(c);
                }
            }
        }
    }
}

/// A frontend with no presentation at all, for headless training and tests
pub type Headless<I = NoInput> = Frontend<NullRenderer, I, Unpaced>;

pub fn headless<I: Input>(input: I) -> Headless<I> {
    Frontend::new(NullRenderer::default(), input, Unpaced)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scripted_input() {
        let mut input = ScriptedInput::new([vec![Command::Jump], vec![]]).then(vec![Command::Quit]);
        assert_eq!(input.poll().unwrap(), [Command::Jump]);
        assert!(input.poll().unwrap().is_empty());
        assert_eq!(input.poll().unwrap(), [Command::Quit]);
        assert_eq!(input.poll().unwrap(), [Command::Quit]);
    }

    #[test]
    fn test_tick_pause_resume() {
        let mut frontend = headless(ScriptedInput::new([
            vec![Command::Jump, Command::Pause],
            vec![Command::Jump],
            vec![Command::Resume],
            vec![Command::Jump],
        ]));
        assert_eq!(frontend.tick().unwrap(), Frame::Run { jump: true });
        assert!(frontend.paused());
        assert_eq!(frontend.tick().unwrap(), Frame::Paused);
        assert_eq!(frontend.tick().unwrap(), Frame::Paused);
        assert!(!frontend.paused());
        assert_eq!(frontend.tick().unwrap(), Frame::Run { jump: true });
        assert_eq!(frontend.renderer.paused, 1);
    }

    #[test]
    fn test_tick_leave() {
        let mut frontend = headless(ScriptedInput::new([
            vec![Command::Menu],
            vec![Command::Pause],
            vec![Command::Menu],
        ]));
        // menu is ignored unless paused
        assert_eq!(frontend.tick().unwrap(), Frame::Run { jump: false });
        assert_eq!(frontend.tick().unwrap(), Frame::Run { jump: false });
        assert_eq!(frontend.tick().unwrap(), Frame::Leave(Leave::Menu));
        assert!(!frontend.paused());

        let mut frontend = headless(ScriptedInput::new([vec![Command::Jump, Command::Quit]]));
        assert_eq!(frontend.tick().unwrap(), Frame::Leave(Leave::Quit));
    }

    #[test]
    fn test_menu() {
        let mut frontend = headless(ScriptedInput::new([
            vec![],
            vec![Command::Jump],
            vec![Command::Train, Command::Play],
        ]));
        assert_eq!(frontend.menu().unwrap(), Command::Train);
        assert_eq!(frontend.renderer.menus, 3);
    }
}
