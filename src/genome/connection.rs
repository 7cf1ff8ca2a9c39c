use super::InnoGen;
use crate::{
    constants::{
        FLAPPY_WEIGHT_INIT_STDEV, FLAPPY_WEIGHT_MAX, FLAPPY_WEIGHT_MIN,
        FLAPPY_WEIGHT_PERTURB_POWER,
    },
    random::{EvolutionEvent, Happens},
};
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// A single weighted path between two nodes of a [super::Genome]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub inno: usize,
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub enabled: bool,
}

impl Connection {
    pub fn new(from: usize, to: usize, weight: f64, inno: &mut InnoGen) -> Self {
        Self {
            inno: inno.path((from, to)),
            from,
            to,
            weight,
            enabled: true,
        }
    }

    #[inline]
    pub fn path(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    /// difference of connection parameters between this and another connection with the
    /// same innovation id
    #[inline]
    pub fn param_diff(&self, other: &Self) -> f64 {
        (self.weight - other.weight).abs()
    }

    /// Perturb the weight, or with some chance replace it outright
    pub fn mutate_param(&mut self, rng: &mut impl Happens) {
        self.weight = if rng.happens(EvolutionEvent::ReplaceWeight) {
            random_weight(rng)
        } else {
            let z: f64 = rng.sample(StandardNormal);
            self.weight + z * FLAPPY_WEIGHT_PERTURB_POWER
        }
        .clamp(FLAPPY_WEIGHT_MIN, FLAPPY_WEIGHT_MAX);
    }

    /// Split this connection around `center`, disabling it. The path into `center` carries a
    /// unit weight, the path out of it inherits ours, so the network's behaviour is unchanged
    /// until either is mutated.
    pub fn bisect(&mut self, center: usize, inno: &mut InnoGen) -> (Self, Self) {
        self.enabled = false;
        (
            // from -{1.}> bisect-node
            Self::new(self.from, center, 1., inno),
            // bisect-node -{w}> to
            Self::new(center, self.to, self.weight, inno),
        )
    }
}

pub fn random_weight(rng: &mut impl RngCore) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    (z * FLAPPY_WEIGHT_INIT_STDEV).clamp(FLAPPY_WEIGHT_MIN, FLAPPY_WEIGHT_MAX)
}
