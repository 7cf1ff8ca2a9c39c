//! Flies a whole generation of agents through one world, turning their decisions into jumps
//! and their fate into fitness.

use crate::{
    config::Training,
    constants::{
        FLAPPY_COLLISION_PENALTY, FLAPPY_JUMP_THRESHOLD, FLAPPY_PASS_REWARD,
        FLAPPY_SURVIVAL_REWARD,
    },
    error::Result,
    frontend::{Frame, Frontend, Input, Leave, Pacer, Renderer, Scene},
    game::{Bird, Flier, Pipe, Tick, World},
    network::{Activation, FeedForward, Network},
    population::Member,
};
use core::ops::ControlFlow;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use tracing::debug;

/// What an agent sees of the pipe it is aiming for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub altitude: f64,
    pub to_gap_top: f64,
    pub to_gap_bottom: f64,
}

impl Observation {
    pub fn of(bird: &Bird, pipe: &Pipe) -> Self {
        Self {
            altitude: bird.y(),
            to_gap_top: (bird.y() - pipe.height()).abs(),
            to_gap_bottom: (bird.y() - pipe.bottom()).abs(),
        }
    }

    #[inline]
    pub fn as_input(&self) -> [f64; 3] {
        [self.altitude, self.to_gap_top, self.to_gap_bottom]
    }
}

/// Decides when a bird jumps, and is told how well it is doing
pub trait Brain {
    /// A jump follows any decision above [FLAPPY_JUMP_THRESHOLD]
    fn decide(&mut self, observation: &Observation) -> f64;
    fn reward(&mut self, delta: f64);
}

/// A member of the population flying on the network built from its genome. Rewards go
/// straight into the member's fitness.
pub struct Trainee<'a> {
    network: FeedForward,
    member: &'a mut Member,
}

impl<'a> Trainee<'a> {
    pub fn new(member: &'a mut Member, σ: Activation) -> Self {
        Self {
            network: FeedForward::from_genome(&member.genome, σ),
            member,
        }
    }
}

impl Brain for Trainee<'_> {
    fn decide(&mut self, observation: &Observation) -> f64 {
        self.network.activate(&observation.as_input())[0]
    }

    fn reward(&mut self, delta: f64) {
        self.member.fitness += delta;
    }
}

new_key_type! {
    pub struct AgentId;
}

pub struct Agent<B> {
    pub bird: Bird,
    pub brain: B,
}

impl<B> Flier for Agent<B> {
    #[inline]
    fn bird(&self) -> &Bird {
        &self.bird
    }

    #[inline]
    fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Death {
    Collided,
    OutOfBounds,
    /// Still flying when a limit ended the generation
    Survived,
}

/// How one generation went. Deaths are in order of retirement, each with the index of the
/// brain as it was handed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub ticks: usize,
    pub score: usize,
    pub deaths: Vec<(usize, Death)>,
}

impl Report {
    pub fn death_of(&self, idx: usize) -> Option<Death> {
        self.deaths
            .iter()
            .find_map(|(i, d)| (*i == idx).then_some(*d))
    }
}

/// Run one generation through the pipes of `seed` until every agent has retired, or until a
/// tick or score limit is hit.
pub fn evaluate<B, R, I, P>(
    frontend: &mut Frontend<R, I, P>,
    brains: impl IntoIterator<Item = B>,
    generation: usize,
    limits: &Training,
    seed: u64,
) -> Result<ControlFlow<Leave, Report>>
where
    B: Brain,
    R: Renderer,
    I: Input,
    P: Pacer,
{
    evaluate_in(frontend, World::new(seed), brains, generation, limits)
}

/// [evaluate] in a prepared world. Every tick each agent moves, earns the survival reward and
/// decides whether to jump; then the world steps and its outcome is [settle]d.
pub fn evaluate_in<B, R, I, P>(
    frontend: &mut Frontend<R, I, P>,
    mut world: World,
    brains: impl IntoIterator<Item = B>,
    generation: usize,
    limits: &Training,
) -> Result<ControlFlow<Leave, Report>>
where
    B: Brain,
    R: Renderer,
    I: Input,
    P: Pacer,
{
    let mut flock = SlotMap::<AgentId, Agent<B>>::with_key();
    let mut index = SecondaryMap::new();
    for (idx, brain) in brains.into_iter().enumerate() {
        let id = flock.insert(Agent {
            bird: Bird::default(),
            brain,
        });
        index.insert(id, idx);
    }

    let mut deaths = Vec::with_capacity(flock.len());
    let mut ticks = 0;
    while !flock.is_empty() {
        match frontend.tick()? {
            Frame::Leave(leave) => return Ok(ControlFlow::Break(leave)),
            Frame::Paused => continue,
            Frame::Run { .. } => {}
        }

        let target = flock
            .values()
            .next()
            .and_then(|lead| world.target_pipe(lead.bird.x()));
        for agent in flock.values_mut() {
            agent.bird.advance_tick();
            agent.brain.reward(FLAPPY_SURVIVAL_REWARD);
            if let Some(pipe) = target.map(|idx| &world.pipes()[idx]) {
                let observation = Observation::of(&agent.bird, pipe);
                if agent.brain.decide(&observation) > FLAPPY_JUMP_THRESHOLD {
                    agent.bird.jump();
                }
            }
        }

        let tick = world.step(&mut flock);
        ticks += 1;
        for (id, death) in settle(&mut flock, tick) {
            debug!(agent = index[id], ticks, ?death, "retired");
            deaths.push((index[id], death));
        }

        frontend.renderer.draw(&Scene {
            world: &world,
            birds: flock.values().map(Flier::bird).collect(),
            generation: Some(generation),
            target,
            sight_lines: frontend.sight_lines,
        })?;

        let limited = limits.tick_limit.is_some_and(|l| ticks >= l)
            || limits.score_limit.is_some_and(|l| world.score() >= l);
        if limited {
            debug!(ticks, score = world.score(), alive = flock.len(), "limit reached");
            for (id, _) in flock.drain() {
                deaths.push((index[id], Death::Survived));
            }
        }
    }

    Ok(ControlFlow::Continue(Report {
        ticks,
        score: world.score(),
        deaths,
    }))
}

/// Reward one step's outcome. Colliders are penalized, and a pass pays every agent still
/// flying plus those about to retire out of bounds. Returns the retired, colliders first.
fn settle<B: Brain>(
    flock: &mut SlotMap<AgentId, Agent<B>>,
    tick: Tick<AgentId, Agent<B>>,
) -> Vec<(AgentId, Death)> {
    let Tick {
        collided,
        mut out_of_bounds,
        passed,
    } = tick;
    let mut retired = Vec::with_capacity(collided.len() + out_of_bounds.len());
    for (id, mut agent) in collided {
        agent.brain.reward(FLAPPY_COLLISION_PENALTY);
        retired.push((id, Death::Collided));
    }
    if passed {
        let survivors = flock.values_mut().map(|a| &mut a.brain);
        let strays = out_of_bounds.iter_mut().map(|(_, a)| &mut a.brain);
        for brain in survivors.chain(strays) {
            brain.reward(FLAPPY_PASS_REWARD);
        }
    }
    retired.extend(out_of_bounds.into_iter().map(|(id, _)| (id, Death::OutOfBounds)));
    retired
}
