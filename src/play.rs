//! A single human-controlled round.

use crate::{
    error::Result,
    frontend::{Frame, Frontend, Input, Leave, Pacer, Renderer, Scene},
    game::{Bird, World},
};
use core::ops::ControlFlow;
use slotmap::{DefaultKey, SlotMap};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub score: usize,
    pub ticks: usize,
}

/// Fly one bird until it hits a pipe or leaves the playfield. Each frame the bird jumps if
/// asked to, moves, and the world steps.
pub fn play<R: Renderer, I: Input, P: Pacer>(
    frontend: &mut Frontend<R, I, P>,
    seed: u64,
) -> Result<ControlFlow<Leave, Round>> {
    let mut world = World::new(seed);
    let mut flock = SlotMap::<DefaultKey, Bird>::new();
    flock.insert(Bird::default());

    let mut ticks = 0;
    loop {
        let jump = match frontend.tick()? {
            Frame::Leave(leave) => return Ok(ControlFlow::Break(leave)),
            Frame::Paused => continue,
            Frame::Run { jump } => jump,
        };

        for bird in flock.values_mut() {
            if jump {
                bird.jump();
            }
            bird.advance_tick();
        }

        let tick = world.step(&mut flock);
        ticks += 1;

        frontend.renderer.draw(&Scene {
            world: &world,
            birds: flock.values().collect(),
            generation: None,
            target: flock.values().next().and_then(|b| world.target_pipe(b.x())),
            sight_lines: false,
        })?;

        if !tick.collided.is_empty() || !tick.out_of_bounds.is_empty() {
            let round = Round {
                score: world.score(),
                ticks,
            };
            info!(score = round.score, ticks, "round over");
            return Ok(ControlFlow::Continue(round));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontend::{headless, Command, NoInput, ScriptedInput};

    #[test]
    fn test_idle_round_ends_on_floor() {
        let mut frontend = headless(NoInput);
        let flow = play(&mut frontend, 0).unwrap();
        assert_eq!(flow, ControlFlow::Continue(Round { score: 0, ticks: 24 }));
        assert_eq!(frontend.renderer.frames, 24);
    }

    #[test]
    fn test_mashing_jump_leaves_through_the_top() {
        let mut frontend = headless(ScriptedInput::default().then(vec![Command::Jump]));
        let ControlFlow::Continue(round) = play(&mut frontend, 0).unwrap() else {
            panic!("left early")
        };
        assert_eq!(round.score, 0);
        // 350 - 11 per tick, gone once above -50
        assert_eq!(round.ticks, 37);
    }

    #[test]
    fn test_quit_mid_round() {
        let mut frontend = headless(ScriptedInput::new([vec![], vec![], vec![Command::Quit]]));
        assert_eq!(
            play(&mut frontend, 0).unwrap(),
            ControlFlow::Break(Leave::Quit)
        );
        assert_eq!(frontend.renderer.frames, 2);
    }
}
