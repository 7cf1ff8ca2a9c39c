//! Feed-forward networks built from [Genome]s in order to express their behaviour.

use crate::genome::{Genome, NodeKind};
use core::ops::Range;
use serde::{Deserialize, Serialize};

pub mod activate {
    use core::f64::consts::E;

    pub fn steep_sigmoid(x: f64) -> f64 {
        1. / (1. + E.powf(-4.9 * x))
    }

    pub fn tanh(x: f64) -> f64 {
        x.tanh()
    }

    pub fn relu(x: f64) -> f64 {
        if x < 0. {
            0.
        } else {
            x
        }
    }
}

/// Node activation, selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Sigmoid,
    #[default]
    Tanh,
    Relu,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => activate::steep_sigmoid(x),
            Self::Tanh => activate::tanh(x),
            Self::Relu => activate::relu(x),
        }
    }
}

/// The trait for all networks. Right now, only f64 values are used.
pub trait Network {
    /// Propagate some sensory input through the network. Input must be sized to fit within
    /// [Genome::sensory].
    fn step(&mut self, input: &[f64]);

    /// Get the network's most recent output, sized to [Genome::action].
    fn output(&self) -> &[f64];

    fn activate(&mut self, input: &[f64]) -> &[f64] {
        self.step(input);
        self.output()
    }
}

/// A stateless network evaluated once per step, node by node in topological order over the
/// enabled connections
#[derive(Debug, Clone)]
pub struct FeedForward {
    /// Nodes to evaluate, each with its incoming (source, weight) pairs
    order: Vec<(usize, Vec<(usize, f64)>)>,
    state: Vec<f64>,
    sensory: Range<usize>,
    action: Range<usize>,
    σ: Activation,
}

impl FeedForward {
    pub fn from_genome(genome: &Genome, σ: Activation) -> Self {
        let size = genome.nodes().len();
        let mut incoming = vec![vec![]; size];
        let mut outgoing = vec![vec![]; size];
        let mut pending = vec![0usize; size];
        for c in genome.connections().iter().filter(|c| c.enabled) {
            incoming[c.to].push((c.from, c.weight));
            outgoing[c.from].push(c.to);
            pending[c.to] += 1;
        }

        // Kahn's algorithm; genomes are acyclic so every node is eventually visited
        let mut ready = (0..size).filter(|n| pending[*n] == 0).collect::<Vec<_>>();
        let mut order = Vec::with_capacity(size);
        while let Some(node) = ready.pop() {
            if matches!(
                genome.nodes()[node],
                NodeKind::Action | NodeKind::Internal
            ) && !incoming[node].is_empty()
            {
                order.push((node, core::mem::take(&mut incoming[node])));
            }
            for &to in outgoing[node].iter() {
                pending[to] -= 1;
                if pending[to] == 0 {
                    ready.push(to);
                }
            }
        }

        let mut state = vec![0.; size];
        state[genome.bias()] = 1.;
        Self {
            order,
            state,
            sensory: genome.sensory(),
            action: genome.action(),
            σ,
        }
    }
}

impl Network for FeedForward {
    fn step(&mut self, input: &[f64]) {
        debug_assert!(input.len() == self.sensory.len());
        self.state[self.sensory.clone()].copy_from_slice(input);
        for (node, incoming) in self.order.iter() {
            let sum = incoming
                .iter()
                .fold(0., |acc, (from, weight)| acc + self.state[*from] * weight);
            self.state[*node] = self.σ.apply(sum);
        }
    }

    fn output(&self) -> &[f64] {
        &self.state[self.action.clone()]
    }
}
