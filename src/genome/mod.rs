//! Feed-forward NEAT genomes: node kinds, innovation tracking, structural mutation and
//! crossover.

pub mod connection;
pub use connection::Connection;

use crate::{
    crossover::crossover,
    error::Result,
    random::{EvolutionEvent, Happens},
};
use connection::random_weight;
use core::{
    cmp::{max, Ordering},
    ops::Range,
};
use fxhash::{FxHashMap, FxHashSet};
use rand::{
    seq::{IndexedMutRandom, IndexedRandom, IteratorRandom},
    RngCore,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Sensory,
    Action,
    Internal,
    /// Always emits 1, standing in for a per-node bias
    Static,
}

/// Hands out innovation ids, reusing the id of any path already seen this generation so that
/// identical structural mutations line up during crossover
#[derive(Debug, Clone)]
pub struct InnoGen {
    pub head: usize,
    seen: FxHashMap<(usize, usize), usize>,
}

impl InnoGen {
    pub fn new(head: usize) -> Self {
        Self {
            head,
            seen: FxHashMap::default(),
        }
    }

    pub fn path(&mut self, v: (usize, usize)) -> usize {
        match self.seen.get(&v) {
            Some(n) => *n,
            None => {
                let n = self.head;
                self.head += 1;
                self.seen.insert(v, n);
                n
            }
        }
    }
}

/// A genome whose connections never form a cycle, disabled connections included, so that it
/// can always be evaluated in a single forward pass.
///
/// Nodes are laid out as `[sensory.., action.., static, internal..]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    sensory: usize,
    action: usize,
    nodes: Vec<NodeKind>,
    connections: Vec<Connection>,
}

impl Genome {
    /// A new unconnected genome with a known input and output size, along with the first
    /// innovation id not reserved by [Genome::fully_connected]
    pub fn new(sensory: usize, action: usize) -> (Self, usize) {
        let mut nodes = Vec::with_capacity(sensory + action + 1);
        nodes.extend((0..sensory).map(|_| NodeKind::Sensory));
        nodes.extend((0..action).map(|_| NodeKind::Action));
        nodes.push(NodeKind::Static);

        (
            Self {
                sensory,
                action,
                nodes,
                connections: vec![],
            },
            (sensory + 1) * action,
        )
    }

    /// A genome where every sensory node and the static node feed every action node, with
    /// randomly drawn weights. Innovation ids are positional, so every genome built this
    /// way agrees on them.
    pub fn fully_connected(sensory: usize, action: usize, rng: &mut impl RngCore) -> (Self, usize) {
        let (mut genome, inno_head) = Self::new(sensory, action);
        let bias = genome.bias();
        for (row, from) in genome.sensory().chain([bias]).enumerate() {
            for (col, to) in genome.action().enumerate() {
                genome.connections.push(Connection {
                    inno: row * action + col,
                    from,
                    to,
                    weight: random_weight(rng),
                    enabled: true,
                });
            }
        }
        (genome, inno_head)
    }

    #[inline]
    pub fn sensory(&self) -> Range<usize> {
        0..self.sensory
    }

    #[inline]
    pub fn action(&self) -> Range<usize> {
        self.sensory..self.sensory + self.action
    }

    /// Index of the static node
    #[inline]
    pub fn bias(&self) -> usize {
        self.sensory + self.action
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeKind] {
        &self.nodes
    }

    #[inline]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Push a connection onto the genome. The caller is responsible for keeping it acyclic.
    #[inline]
    pub fn push_connection(&mut self, connection: Connection) {
        debug_assert!(!self.creates_cycle(connection.from, connection.to));
        self.connections.push(connection);
    }

    /// Whether a new path `from -> to` would close a loop, that is whether `from` is already
    /// reachable from `to`
    pub fn creates_cycle(&self, from: usize, to: usize) -> bool {
        reachable(&self.connections, to, from)
    }

    /// Pick a random pair of nodes that may be connected: not already connected, not
    /// feeding a sensory or static node, not reading from an action node, and not closing a
    /// cycle
    pub fn open_path(&self, rng: &mut impl RngCore) -> Option<(usize, usize)> {
        let taken = self
            .connections
            .iter()
            .map(Connection::path)
            .collect::<FxHashSet<_>>();

        let kinds = &self.nodes;
        (0..kinds.len())
            .filter(|from| !matches!(kinds[*from], NodeKind::Action))
            .flat_map(move |from| {
                (0..kinds.len())
                    .filter(move |to| matches!(kinds[*to], NodeKind::Action | NodeKind::Internal))
                    .map(move |to| (from, to))
            })
            .filter(|&(from, to)| {
                from != to && !taken.contains(&(from, to)) && !self.creates_cycle(from, to)
            })
            .choose(rng)
    }

    /// Generate a new connection with a random weight. Returns whether one could be added.
    pub fn new_connection(&mut self, rng: &mut impl RngCore, inno: &mut InnoGen) -> bool {
        match self.open_path(rng) {
            Some((from, to)) => {
                let weight = random_weight(rng);
                self.connections
                    .push(Connection::new(from, to, weight, inno));
                true
            }
            None => false,
        }
    }

    /// Bisect a random enabled connection with a new internal node. Returns whether there
    /// was a connection to bisect.
    pub fn bisect_connection(&mut self, rng: &mut impl RngCore, inno: &mut InnoGen) -> bool {
        let Some(&idx) = self
            .connections
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.enabled.then_some(idx))
            .collect::<Vec<_>>()
            .choose(rng)
        else {
            return false;
        };

        let center = self.nodes.len();
        self.nodes.push(NodeKind::Internal);
        let (l, r) = self.connections[idx].bisect(center, inno);
        self.connections.push(l);
        self.connections.push(r);
        true
    }

    /// Flip the enabled state of a random connection
    pub fn toggle_connection(&mut self, rng: &mut impl RngCore) {
        if let Some(c) = self.connections.choose_mut(rng) {
            c.enabled = !c.enabled;
        }
    }

    /// Roll a parameter mutation for every connection
    pub fn mutate_params(&mut self, rng: &mut impl Happens) {
        for c in self.connections.iter_mut() {
            if rng.happens(EvolutionEvent::MutateWeight) {
                c.mutate_param(rng);
            }
        }
    }

    /// Perform 0 or more mutations on this genome
    pub fn mutate(&mut self, rng: &mut impl Happens, inno: &mut InnoGen) {
        self.mutate_params(rng);
        if rng.happens(EvolutionEvent::NewConnection) {
            self.new_connection(rng, inno);
        }
        if rng.happens(EvolutionEvent::Bisection) {
            self.bisect_connection(rng, inno);
        }
        if rng.happens(EvolutionEvent::ToggleEnabled) {
            self.toggle_connection(rng);
        }
    }

    /// Perform crossover reproduction with other, where our fitness is `fitness_cmp` compared
    /// to other. Inherited genes that would close a cycle in the child are dropped.
    pub fn reproduce_with(&self, other: &Self, fitness_cmp: Ordering, rng: &mut impl Happens) -> Self {
        let inherited = crossover(&self.connections, &other.connections, fitness_cmp, rng);

        let mut connections: Vec<Connection> = Vec::with_capacity(inherited.len());
        for c in inherited {
            if !reachable(&connections, c.to, c.from) {
                connections.push(c);
            }
        }

        let nodes_size = connections
            .iter()
            .fold(0, |acc, c| max(acc, max(c.from, c.to)));
        let total_nodes = max(nodes_size + 1, self.sensory + self.action + 1);
        let mut nodes = Vec::with_capacity(total_nodes);
        nodes.extend((0..self.sensory).map(|_| NodeKind::Sensory));
        nodes.extend((0..self.action).map(|_| NodeKind::Action));
        nodes.push(NodeKind::Static);
        nodes.extend((self.sensory + self.action + 1..total_nodes).map(|_| NodeKind::Internal));

        Self {
            sensory: self.sensory,
            action: self.action,
            nodes,
            connections,
        }
    }

    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string()?)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

/// Whether `target` can be reached from `start` by following connections, disabled ones
/// included
fn reachable(connections: &[Connection], start: usize, target: usize) -> bool {
    if start == target {
        return true;
    }

    let mut seen = FxHashSet::default();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for c in connections.iter().filter(|c| c.from == node) {
            if c.to == target {
                return true;
            }
            if seen.insert(c.to) {
                stack.push(c.to);
            }
        }
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::random::{default_rng, ProbBinding, ProbStatic, WyRng};

    #[test]
    fn test_inno_gen() {
        let mut inno = InnoGen::new(0);
        assert_eq!(inno.head, 0);
        assert_eq!(inno.path((0, 1)), 0);
        assert_eq!(inno.path((1, 2)), 1);
        assert_eq!(inno.path((0, 1)), 0);
        assert_eq!(inno.head, 2);

        let mut inno2 = InnoGen::new(inno.head);
        assert_eq!(inno2.path((1, 0)), 2);
        assert_eq!(inno2.path((0, 1)), 3);
    }

    #[test]
    fn test_genome_creation() {
        let (genome, inno_head) = Genome::new(3, 2);
        assert_eq!(inno_head, 8);
        assert_eq!(genome.sensory().len(), 3);
        assert_eq!(genome.action().len(), 2);
        assert_eq!(genome.nodes().len(), 6);
        assert_eq!(genome.nodes()[0], NodeKind::Sensory);
        assert_eq!(genome.nodes()[3], NodeKind::Action);
        assert_eq!(genome.nodes()[5], NodeKind::Static);
        assert_eq!(genome.bias(), 5);
    }

    #[test]
    fn test_fully_connected() {
        let (genome, inno_head) = Genome::fully_connected(3, 1, &mut default_rng());
        assert_eq!(inno_head, 4);
        assert_eq!(genome.connections().len(), 4);
        let paths = genome
            .connections()
            .iter()
            .map(Connection::path)
            .collect::<Vec<_>>();
        assert_eq!(paths, vec![(0, 3), (1, 3), (2, 3), (4, 3)]);
        let innos = genome
            .connections()
            .iter()
            .map(|c| c.inno)
            .collect::<Vec<_>>();
        assert_eq!(innos, vec![0, 1, 2, 3]);
        assert!(genome.connections().iter().all(|c| c.inno < inno_head));
    }

    #[test]
    fn test_open_path() {
        let (mut genome, _) = Genome::new(1, 1);

        for _ in 0..100 {
            match genome.open_path(&mut default_rng()) {
                Some((0, 1)) | Some((2, 1)) => {} // sensory -> action, bias -> action
                Some(p) => unreachable!("invalid pair {p:?} gen'd"),
                None => unreachable!("no path gen'd"),
            }
        }

        genome.push_connection(Connection::new(2, 1, 1., &mut InnoGen::new(0)));
        for _ in 0..100 {
            assert_eq!(genome.open_path(&mut default_rng()), Some((0, 1)));
        }

        genome.push_connection(Connection::new(0, 1, 1., &mut InnoGen::new(1)));
        assert_eq!(genome.open_path(&mut default_rng()), None);
    }

    #[test]
    fn test_open_path_never_cycles() {
        let mut rng = default_rng();
        let (mut genome, head) = Genome::fully_connected(2, 1, &mut rng);
        let mut inno = InnoGen::new(head);
        for _ in 0..20 {
            genome.bisect_connection(&mut rng, &mut inno);
            genome.new_connection(&mut rng, &mut inno);
        }
        for c in genome.connections() {
            let rest = genome
                .connections()
                .iter()
                .filter(|o| o.inno != c.inno || o.path() != c.path())
                .cloned()
                .collect::<Vec<_>>();
            assert!(!reachable(&rest, c.to, c.from), "cycle through {c:?}");
        }
    }

    #[test]
    fn test_bisection() {
        let mut inno = InnoGen::new(0);
        let (mut genome, _) = Genome::new(0, 1);
        genome.push_connection(Connection::new(1, 0, 0.3, &mut inno));

        let innogen = &mut InnoGen::new(1);
        assert!(genome.bisect_connection(&mut default_rng(), innogen));

        let c = genome.connections();
        assert!(!c[0].enabled);
        assert_eq!(c[1].path(), (1, 2));
        assert_eq!(c[1].weight, 1.0);
        assert_eq!(c[2].path(), (2, 0));
        assert_eq!(c[2].weight, 0.3);
        assert_eq!(genome.nodes()[2], NodeKind::Internal);
        assert_eq!(c[1].inno, innogen.path(c[1].path()));
    }

    #[test]
    fn test_bisection_nothing_enabled() {
        let (mut genome, _) = Genome::new(2, 2);
        assert!(!genome.bisect_connection(&mut default_rng(), &mut InnoGen::new(0)));

        let mut c = Connection::new(0, 2, 1., &mut InnoGen::new(0));
        c.enabled = false;
        genome.push_connection(c);
        assert!(!genome.bisect_connection(&mut default_rng(), &mut InnoGen::new(0)));
    }

    #[test]
    fn test_mutate_always_grows() {
        let mut rng = ProbBinding::new(
            ProbStatic::default().with_overrides(&[
                (EvolutionEvent::NewConnection, u64::MAX),
                (EvolutionEvent::Bisection, u64::MAX),
                (EvolutionEvent::ToggleEnabled, 0),
            ]),
            WyRng::seeded(3),
        );
        let (mut genome, head) = Genome::fully_connected(3, 1, &mut rng);
        let mut inno = InnoGen::new(head);
        genome.mutate(&mut rng, &mut inno);
        assert_eq!(genome.nodes().len(), 6);
        assert!(genome.connections().len() >= 6);
    }

    #[test]
    fn test_reproduce_is_acyclic_and_sized() {
        let mut rng = ProbBinding::new(ProbStatic::default(), WyRng::seeded(21));
        let (base, head) = Genome::fully_connected(3, 1, &mut rng);
        let mut inno = InnoGen::new(head);
        let (mut l, mut r) = (base.clone(), base);
        for _ in 0..10 {
            l.mutate(&mut rng, &mut inno);
            r.mutate(&mut rng, &mut inno);
        }

        for fit in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            let child = l.reproduce_with(&r, fit, &mut rng);
            assert_eq!(child.sensory(), l.sensory());
            assert_eq!(child.action(), l.action());
            for c in child.connections() {
                assert!(c.from < child.nodes().len() && c.to < child.nodes().len());
            }
            for (idx, c) in child.connections().iter().enumerate() {
                let mut rest = child.connections().to_vec();
                rest.remove(idx);
                assert!(!reachable(&rest, c.to, c.from));
            }
        }
    }

    #[test]
    fn test_json_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("champ.json");
        let (genome, _) = Genome::fully_connected(3, 1, &mut default_rng());
        genome.to_file(&path).unwrap();
        assert_eq!(Genome::from_file(&path).unwrap(), genome);
    }
}
