//! Grouping genomes into species by compatibility distance.

use crate::{
    crossover::delta,
    genome::{Connection, Genome},
};
use core::cmp::Ordering;

/// A specie persists across generations through its representative, which new genomes are
/// measured against, and its best-ever fitness, which decides when it has stagnated.
#[derive(Debug, Clone)]
pub struct Specie {
    pub id: usize,
    pub repr: Vec<Connection>,
    /// Indices into the population's members
    pub members: Vec<usize>,
    pub best: f64,
    /// Generation in which `best` last improved
    pub last_improved: usize,
}

impl Specie {
    pub fn new(id: usize, repr: &Genome, generation: usize) -> Self {
        Self {
            id,
            repr: repr.connections().to_vec(),
            members: vec![],
            best: f64::MIN,
            last_improved: generation,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Mean member fitness
    pub fn fit_adjusted(&self, fitness: &[f64]) -> f64 {
        let l = self.len() as f64;
        self.members
            .iter()
            .fold(0., |acc, idx| acc + fitness[*idx] / l)
    }

    /// Best member fitness this generation
    pub fn fit_max(&self, fitness: &[f64]) -> f64 {
        self.members
            .iter()
            .map(|idx| fitness[*idx])
            .fold(f64::MIN, f64::max)
    }

    /// Record this generation's best fitness, returning how many generations the specie has
    /// gone without improving
    pub fn observe(&mut self, fitness: &[f64], generation: usize) -> usize {
        let max = self.fit_max(fitness);
        if max > self.best {
            self.best = max;
            self.last_improved = generation;
        }
        generation - self.last_improved
    }

    /// Members sorted fittest first
    pub fn ranked(&self, fitness: &[f64]) -> Vec<usize> {
        let mut ranked = self.members.clone();
        ranked.sort_by(|l, r| fitness[*r].total_cmp(&fitness[*l]));
        ranked
    }
}

/// Assign every genome to the first specie whose representative lies within `threshold`,
/// founding a new specie otherwise. Each surviving specie's representative then moves to
/// the member closest to it, and species left without members are dropped.
pub fn speciate(
    species: &mut Vec<Specie>,
    genomes: &[Genome],
    threshold: f64,
    next_id: &mut usize,
    generation: usize,
) {
    for s in species.iter_mut() {
        s.members.clear();
    }

    for (idx, genome) in genomes.iter().enumerate() {
        match species
            .iter_mut()
            .find(|s| delta(&s.repr, genome.connections()) < threshold)
        {
            Some(s) => s.members.push(idx),
            None => {
                let mut s = Specie::new(*next_id, genome, generation);
                *next_id += 1;
                s.members.push(idx);
                species.push(s);
            }
        }
    }

    species.retain(|s| !s.is_empty());
    for s in species.iter_mut() {
        let closest = s
            .members
            .iter()
            .map(|idx| (*idx, delta(&s.repr, genomes[*idx].connections())))
            .min_by(|(_, l), (_, r)| l.partial_cmp(r).unwrap_or(Ordering::Equal))
            .map(|(idx, _)| idx);
        if let Some(idx) = closest {
            s.repr = genomes[idx].connections().to_vec();
        }
    }
}
