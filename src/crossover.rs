//! Gene alignment between two genomes: crossover and compatibility distance.

use crate::{
    constants::{
        FLAPPY_DISJOINT_COEFFICIENT, FLAPPY_EXCESS_COEFFICIENT, FLAPPY_NORMALIZATION_THRESHOLD,
        FLAPPY_PARAM_COEFFICIENT,
    },
    genome::Connection,
    random::{EvolutionEvent, Happens},
};
use core::cmp::Ordering;

fn sorted(connections: &[Connection]) -> Vec<&Connection> {
    let mut v = connections.iter().collect::<Vec<_>>();
    v.sort_by_key(|c| c.inno);
    v
}

/// Align two connection lists by innovation id. Matching genes are inherited from either
/// parent, disjoint and excess genes only from the fitter one (`l` when fitness is equal).
/// A gene disabled in either parent stays disabled with some probability.
pub fn crossover(
    l: &[Connection],
    r: &[Connection],
    l_fit: Ordering,
    rng: &mut impl Happens,
) -> Vec<Connection> {
    let (l, r) = (sorted(l), sorted(r));
    let l_fitter = l_fit != Ordering::Less;
    let mut child = Vec::with_capacity(if l_fitter { l.len() } else { r.len() });

    let (mut i, mut j) = (0, 0);
    while i < l.len() || j < r.len() {
        match (l.get(i), r.get(j)) {
            (Some(lc), Some(rc)) if lc.inno == rc.inno => {
                let (fit, lesser) = if l_fitter { (lc, rc) } else { (rc, lc) };
                let mut gene = if rng.happens(EvolutionEvent::PickLesser) {
                    (*lesser).clone()
                } else {
                    (*fit).clone()
                };
                gene.enabled = if !lc.enabled || !rc.enabled {
                    !rng.happens(EvolutionEvent::KeepDisabled)
                } else {
                    true
                };
                child.push(gene);
                i += 1;
                j += 1;
            }
            (Some(lc), Some(rc)) if lc.inno < rc.inno => {
                if l_fitter {
                    child.push((*lc).clone());
                }
                i += 1;
            }
            (Some(_), Some(rc)) => {
                if !l_fitter {
                    child.push((*rc).clone());
                }
                j += 1;
            }
            (Some(lc), None) => {
                if l_fitter {
                    child.push((*lc).clone());
                }
                i += 1;
            }
            (None, Some(rc)) => {
                if !l_fitter {
                    child.push((*rc).clone());
                }
                j += 1;
            }
            (None, None) => unreachable!(),
        }
    }

    child
}

/// Count of (disjoint, excess) genes between two connection lists
pub fn disjoint_excess_count(l: &[Connection], r: &[Connection]) -> (f64, f64) {
    let (l, r) = (sorted(l), sorted(r));
    let (Some(l_max), Some(r_max)) = (l.last().map(|c| c.inno), r.last().map(|c| c.inno)) else {
        return (0., (l.len() + r.len()) as f64);
    };
    let bound = l_max.min(r_max);

    let (mut disjoint, mut excess) = (0., 0.);
    let (mut i, mut j) = (0, 0);
    while i < l.len() || j < r.len() {
        let unmatched = match (l.get(i), r.get(j)) {
            (Some(lc), Some(rc)) if lc.inno == rc.inno => {
                i += 1;
                j += 1;
                continue;
            }
            (Some(lc), Some(rc)) if lc.inno < rc.inno => {
                i += 1;
                lc.inno
            }
            (Some(_), Some(rc)) | (None, Some(rc)) => {
                j += 1;
                rc.inno
            }
            (Some(lc), None) => {
                i += 1;
                lc.inno
            }
            (None, None) => unreachable!(),
        };
        if unmatched > bound {
            excess += 1.;
        } else {
            disjoint += 1.;
        }
    }

    (disjoint, excess)
}

/// Mean parameter difference of matching genes, or 0 if there are none
pub fn avg_param_diff(l: &[Connection], r: &[Connection]) -> f64 {
    let (l, r) = (sorted(l), sorted(r));
    let (mut count, mut sum) = (0., 0.);
    let (mut i, mut j) = (0, 0);
    while i < l.len() && j < r.len() {
        match l[i].inno.cmp(&r[j].inno) {
            Ordering::Equal => {
                sum += l[i].param_diff(r[j]);
                count += 1.;
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }

    if count == 0. {
        0.
    } else {
        sum / count
    }
}

/// Compatibility distance between two genomes' connections
pub fn delta(l: &[Connection], r: &[Connection]) -> f64 {
    let size = l.len().max(r.len()) as f64;
    let norm = if size < FLAPPY_NORMALIZATION_THRESHOLD {
        1.
    } else {
        size
    };
    let (disjoint, excess) = disjoint_excess_count(l, r);

    FLAPPY_EXCESS_COEFFICIENT * excess / norm
        + FLAPPY_DISJOINT_COEFFICIENT * disjoint / norm
        + FLAPPY_PARAM_COEFFICIENT * avg_param_diff(l, r)
}
