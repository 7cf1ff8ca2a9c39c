//! Top level session: the main menu and the two modes it dispatches to.

use crate::{
    config::Config,
    error::{Error, Result},
    frontend::{Command, Frontend, Input, Leave, Pacer, Renderer},
    harness::{evaluate, Trainee},
    play::{play, Round},
    population::{Evolved, Population, Stop},
};
use core::ops::ControlFlow;
use std::path::PathBuf;
use tracing::info;

pub struct App<R, I, P> {
    pub frontend: Frontend<R, I, P>,
    config: Config,
    seed: u64,
    rounds: u64,
    champion_path: Option<PathBuf>,
}

impl<R: Renderer, I: Input, P: Pacer> App<R, I, P> {
    pub fn new(frontend: Frontend<R, I, P>, config: Config, seed: u64) -> Self {
        Self {
            frontend,
            config,
            seed,
            rounds: 0,
            champion_path: None,
        }
    }

    /// Write the fittest genome of every training session to `path`
    pub fn with_champion_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.champion_path = Some(path.into());
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loop over the main menu until the user quits
    pub fn run(&mut self) -> Result<()> {
        loop {
            let quit = match self.frontend.menu()? {
                Command::Play => self.play()? == ControlFlow::Break(Leave::Quit),
                Command::Train => self.train()?.stop == Stop::Break(Leave::Quit),
                _ => true,
            };
            if quit {
                info!("quitting");
                return Ok(());
            }
        }
    }

    /// One human round, on a fresh pipe sequence each time
    pub fn play(&mut self) -> Result<ControlFlow<Leave, Round>> {
        let seed = self.seed.wrapping_add(self.rounds);
        self.rounds += 1;
        info!(seed, "starting round");
        play(&mut self.frontend, seed)
    }

    /// Evolve a fresh population until the generation limit, the fitness threshold, or the
    /// user leaves. Generation `g` flies through the pipes seeded by `seed + g`.
    pub fn train(&mut self) -> Result<Evolved<Leave>> {
        let Self {
            frontend,
            config,
            seed,
            champion_path,
            ..
        } = self;
        let (seed, σ) = (*seed, config.neat.activation);
        info!(
            seed,
            population = config.neat.population,
            generations = config.training.generations,
            "starting training"
        );

        let mut population = Population::new(config.neat.clone(), seed);
        let evolved = population.run(config.training.generations, |generation, members| {
            let brains = members.iter_mut().map(|m| Trainee::new(m, σ));
            let flow = evaluate(
                frontend,
                brains,
                generation,
                &config.training,
                seed.wrapping_add(generation as u64),
            )?;
            Ok::<_, Error>(match flow {
                ControlFlow::Break(leave) => ControlFlow::Break(leave),
                ControlFlow::Continue(_) => ControlFlow::Continue(()),
            })
        })?;

        info!(
            generations = evolved.generations,
            stop = ?evolved.stop,
            best = evolved.champion.as_ref().map(|c| c.fitness),
            "training finished"
        );
        if let (Some(path), Some(champion)) = (champion_path.as_deref(), &evolved.champion) {
            champion.genome.to_file(path)?;
            info!(path = %path.display(), fitness = champion.fitness, "saved champion");
        }
        Ok(evolved)
    }
}
