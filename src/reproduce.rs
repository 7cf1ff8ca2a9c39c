//! Functions related to reproducing on the specie and global population scale.

use crate::{
    constants::FLAPPY_REPRODUCTION_COPY_RATIO,
    genome::{Genome, InnoGen},
    random::Happens,
};
use rand::{seq::IndexedRandom, Rng};

/// Pick two distinct members of a pool
#[inline]
fn uniq_2<'a, T>(pool: &'a [T], rng: &mut impl Rng) -> Option<(&'a T, &'a T)> {
    let len = pool.len();
    if len < 2 {
        None
    } else {
        let l = rng.random_range(0..len);
        let r = rng.random_range(0..len - 1);
        Some((&pool[l], &pool[if r >= l { r + 1 } else { r }]))
    }
}

/// Allocate `population` offspring among species proportionally to their adjusted fitness.
/// Every specie is first given `min_size` when the population can afford it. Fitness is
/// shifted so the least fit specie sits at zero, and rounding is by largest remainder so the
/// allocations always sum to `population`.
pub fn population_alloc(fit_adjusted: &[f64], population: usize, min_size: usize) -> Vec<usize> {
    if fit_adjusted.is_empty() {
        return vec![];
    }

    let floor = if min_size * fit_adjusted.len() <= population {
        min_size
    } else {
        0
    };
    let population = population - floor * fit_adjusted.len();

    let min = fit_adjusted.iter().copied().fold(f64::INFINITY, f64::min);
    let shifted = fit_adjusted.iter().map(|f| f - min).collect::<Vec<_>>();
    let total = shifted.iter().sum::<f64>();
    let population_f = population as f64;
    let quotas = if total > 0. && total.is_finite() {
        shifted
            .iter()
            .map(|f| population_f * f / total)
            .collect::<Vec<_>>()
    } else {
        vec![population_f / fit_adjusted.len() as f64; fit_adjusted.len()]
    };

    let mut alloc = quotas.iter().map(|q| q.floor() as usize).collect::<Vec<_>>();
    let mut by_remainder = (0..quotas.len()).collect::<Vec<_>>();
    by_remainder.sort_by(|l, r| {
        (quotas[*r] - quotas[*r].floor()).total_cmp(&(quotas[*l] - quotas[*l].floor()))
    });
    let short = population.saturating_sub(alloc.iter().sum::<usize>());
    for idx in by_remainder.into_iter().cycle().take(short) {
        alloc[idx] += 1;
    }
    alloc.iter_mut().for_each(|a| *a += floor);
    alloc
}

/// Reproduce a specie of genomes ranked fittest first into `size` children. The top `elitism`
/// are carried over unchanged. The rest are bred from the top `survival_threshold` fraction:
/// a quarter as mutated copies, the remainder as mutated crossover children.
pub fn reproduce(
    ranked: &[(&Genome, f64)],
    size: usize,
    elitism: usize,
    survival_threshold: f64,
    inno: &mut InnoGen,
    rng: &mut impl Happens,
) -> Vec<Genome> {
    if size == 0 || ranked.is_empty() {
        return vec![];
    }

    let mut pop = Vec::with_capacity(size);
    pop.extend(
        ranked
            .iter()
            .take(elitism.min(size))
            .map(|(genome, _)| (*genome).clone()),
    );

    let size = size - pop.len();
    if size == 0 {
        return pop;
    }

    let survivors = (ranked.len() as f64 * survival_threshold).ceil() as usize;
    let pool = &ranked[..survivors.clamp(1, ranked.len())];

    let size_copy = size / FLAPPY_REPRODUCTION_COPY_RATIO;
    let size_copy = if size_copy == 0 || pool.len() == 1 {
        size
    } else {
        size_copy
    };

    for _ in 0..size_copy {
        if let Some((genome, _)) = pool.choose(rng) {
            let mut child = (*genome).clone();
            child.mutate(rng, inno);
            pop.push(child);
        }
    }

    for _ in size_copy..size {
        if let Some(((l, l_fit), (r, r_fit))) = uniq_2(pool, rng) {
            let mut child = l.reproduce_with(r, l_fit.total_cmp(r_fit), rng);
            child.mutate(rng, inno);
            pop.push(child);
        }
    }

    pop
}
