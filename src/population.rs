//! The population driver: evaluate, speciate, cull and reproduce, generation after generation.

use crate::{
    config::Neat,
    constants::{FLAPPY_ACTION, FLAPPY_SENSORY},
    genome::{Genome, InnoGen},
    random::{evolution_rng, EvolutionRng},
    reproduce::{population_alloc, reproduce},
    specie::{speciate, Specie},
};
use core::ops::ControlFlow;
use tracing::{info, warn};

/// A genome along with the fitness it accumulated during its latest evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub genome: Genome,
    pub fitness: f64,
}

/// Summary of one evaluated generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub generation: usize,
    pub best: f64,
    pub mean: f64,
    pub stdev: f64,
    pub species: usize,
}

impl Stats {
    fn of(generation: usize, members: &[Member], species: usize) -> Self {
        let n = members.len().max(1) as f64;
        let best = members
            .iter()
            .map(|m| m.fitness)
            .fold(f64::MIN, f64::max);
        let mean = members.iter().map(|m| m.fitness).sum::<f64>() / n;
        let var = members
            .iter()
            .map(|m| (m.fitness - mean).powi(2))
            .sum::<f64>()
            / n;
        Self {
            generation,
            best,
            mean,
            stdev: var.sqrt(),
            species,
        }
    }
}

/// Why [Population::run] stopped
#[derive(Debug, Clone, PartialEq)]
pub enum Stop<B> {
    /// The generation limit was reached
    Generations,
    /// A genome met the configured fitness threshold
    Fitness,
    /// The evaluation callback broke out
    Break(B),
}

#[derive(Debug, Clone)]
pub struct Evolved<B> {
    /// The fittest genome ever evaluated
    pub champion: Option<Member>,
    pub generations: usize,
    pub stop: Stop<B>,
}

pub struct Population {
    config: Neat,
    members: Vec<Member>,
    species: Vec<Specie>,
    generation: usize,
    next_specie: usize,
    inno_head: usize,
    rng: EvolutionRng,
    champion: Option<Member>,
    stats: Vec<Stats>,
}

impl Population {
    /// A population of fully connected genomes with random weights
    pub fn new(config: Neat, seed: u64) -> Self {
        let mut rng = evolution_rng(&config.mutation, seed);
        let (members, inno_head) = Self::seed(&config, &mut rng);
        let mut population = Self {
            config,
            members,
            species: vec![],
            generation: 0,
            next_specie: 0,
            inno_head,
            rng,
            champion: None,
            stats: vec![],
        };
        population.speciate();
        population
    }

    fn seed(config: &Neat, rng: &mut EvolutionRng) -> (Vec<Member>, usize) {
        let mut inno_head = 0;
        let members = (0..config.population)
            .map(|_| {
                let (genome, head) = Genome::fully_connected(FLAPPY_SENSORY, FLAPPY_ACTION, rng);
                inno_head = head;
                Member {
                    genome,
                    fitness: 0.,
                }
            })
            .collect();
        (members, inno_head)
    }

    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[inline]
    pub fn species(&self) -> &[Specie] {
        &self.species
    }

    #[inline]
    pub fn stats(&self) -> &[Stats] {
        &self.stats
    }

    #[inline]
    pub fn champion(&self) -> Option<&Member> {
        self.champion.as_ref()
    }

    /// Evaluate and evolve until `generations` generations have been evaluated, a member
    /// meets the fitness threshold, or `eval` breaks. `eval` is handed the generation index
    /// and every member with its fitness reset to 0, and is expected to score them.
    pub fn run<B, E>(
        &mut self,
        generations: usize,
        mut eval: impl FnMut(usize, &mut [Member]) -> Result<ControlFlow<B>, E>,
    ) -> Result<Evolved<B>, E> {
        let first = self.generation;
        let stop = loop {
            if self.generation - first >= generations {
                break Stop::Generations;
            }

            for m in self.members.iter_mut() {
                m.fitness = 0.;
            }
            if let ControlFlow::Break(b) = eval(self.generation, &mut self.members)? {
                break Stop::Break(b);
            }

            let stats = Stats::of(self.generation, &self.members, self.species.len());
            info!(
                generation = stats.generation,
                best = stats.best,
                mean = stats.mean,
                stdev = stats.stdev,
                species = stats.species,
                "generation evaluated"
            );
            self.stats.push(stats);
            self.record_champion();

            if self
                .config
                .fitness_threshold
                .is_some_and(|t| stats.best >= t)
            {
                self.generation += 1;
                break Stop::Fitness;
            }

            self.evolve();
            self.generation += 1;
        };

        Ok(Evolved {
            champion: self.champion.clone(),
            generations: self.generation - first,
            stop,
        })
    }

    fn record_champion(&mut self) {
        let Some(best) = self
            .members
            .iter()
            .max_by(|l, r| l.fitness.total_cmp(&r.fitness))
        else {
            return;
        };
        if !matches!(&self.champion, Some(c) if c.fitness >= best.fitness) {
            self.champion = Some(best.clone());
        }
    }

    fn speciate(&mut self) {
        let genomes = self
            .members
            .iter()
            .map(|m| m.genome.clone())
            .collect::<Vec<_>>();
        speciate(
            &mut self.species,
            &genomes,
            self.config.compatibility_threshold,
            &mut self.next_specie,
            self.generation,
        );
    }

    /// Cull stagnant species, then replace the members with the next generation's offspring
    fn evolve(&mut self) {
        let fitness = self.members.iter().map(|m| m.fitness).collect::<Vec<_>>();

        let mut ranked = self
            .species
            .iter_mut()
            .map(|s| {
                let stagnant = s.observe(&fitness, self.generation);
                (s.fit_max(&fitness), stagnant)
            })
            .enumerate()
            .collect::<Vec<_>>();
        ranked.sort_by(|(_, (l, _)), (_, (r, _))| r.total_cmp(l));
        let culled = ranked
            .iter()
            .skip(self.config.species_elitism)
            .filter(|(_, (_, stagnant))| *stagnant >= self.config.max_stagnation)
            .map(|(idx, _)| *idx)
            .collect::<Vec<_>>();
        for idx in culled.iter() {
            let s = &self.species[*idx];
            warn!(specie = s.id, best = s.best, "culling stagnant specie");
        }
        let mut idx = 0;
        self.species.retain(|_| {
            idx += 1;
            !culled.contains(&(idx - 1))
        });

        let mut inno = InnoGen::new(self.inno_head);
        let members = if self.species.is_empty() {
            warn!("every specie went extinct, reseeding");
            let (members, head) = Self::seed(&self.config, &mut self.rng);
            inno.head = inno.head.max(head);
            members
        } else {
            let adjusted = self
                .species
                .iter()
                .map(|s| s.fit_adjusted(&fitness))
                .collect::<Vec<_>>();
            let alloc = population_alloc(
                &adjusted,
                self.config.population,
                self.config.elitism.max(1),
            );

            let mut next = Vec::with_capacity(self.config.population);
            for (s, size) in self.species.iter().zip(alloc) {
                let ordered = s
                    .ranked(&fitness)
                    .into_iter()
                    .map(|idx| (&self.members[idx].genome, fitness[idx]))
                    .collect::<Vec<_>>();
                next.extend(
                    reproduce(
                        &ordered,
                        size,
                        self.config.elitism,
                        self.config.survival_threshold,
                        &mut inno,
                        &mut self.rng,
                    )
                    .into_iter()
                    .map(|genome| Member {
                        genome,
                        fitness: 0.,
                    }),
                );
            }
            next
        };

        self.inno_head = inno.head;
        self.members = members;
        self.speciate();
    }
}
