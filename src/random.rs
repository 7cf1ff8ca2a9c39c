use crate::{config::Mutation, constants};
use core::cmp::min;
use rand::RngCore;

/// Every random decision the evolution engine makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionEvent {
    MutateWeight,
    ReplaceWeight,
    NewConnection,
    Bisection,
    ToggleEnabled,
    KeepDisabled,
    PickLesser,
}

/// Scale a probability in [0, 1] onto the u64 range rolled against in [Happens]
pub fn chance(p: f64) -> u64 {
    if p >= 1. {
        u64::MAX
    } else if p <= 0. {
        0
    } else {
        (p * u64::MAX as f64) as u64
    }
}

pub trait Probabilities {
    fn probability(&self, evt: EvolutionEvent) -> u64;
}

pub trait Happens: RngCore + Probabilities {
    fn happens(&mut self, evt: EvolutionEvent) -> bool;
}

impl<T: RngCore + Probabilities> Happens for T {
    fn happens(&mut self, evt: EvolutionEvent) -> bool {
        self.probability(evt) > self.next_u64()
    }
}

#[derive(Debug, Clone)]
pub struct ProbStatic {
    mutate_weight: u64,
    replace_weight: u64,
    new_connection: u64,
    bisection: u64,
    toggle_enabled: u64,
    keep_disabled: u64,
    pick_lesser: u64,
}

#[cfg(test)]
impl ProbStatic {
    pub fn with_overrides(mut self, overrides: &[(EvolutionEvent, u64)]) -> Self {
        for &(evt, v) in overrides {
            let field = match evt {
                EvolutionEvent::MutateWeight => &mut self.mutate_weight,
                EvolutionEvent::ReplaceWeight => &mut self.replace_weight,
                EvolutionEvent::NewConnection => &mut self.new_connection,
                EvolutionEvent::Bisection => &mut self.bisection,
                EvolutionEvent::ToggleEnabled => &mut self.toggle_enabled,
                EvolutionEvent::KeepDisabled => &mut self.keep_disabled,
                EvolutionEvent::PickLesser => &mut self.pick_lesser,
            };
            *field = v;
        }
        self
    }
}

impl Default for ProbStatic {
    fn default() -> Self {
        Self::from(&Mutation::default())
    }
}

impl From<&Mutation> for ProbStatic {
    fn from(m: &Mutation) -> Self {
        Self {
            mutate_weight: chance(m.weight_mutate),
            replace_weight: chance(m.weight_replace),
            new_connection: chance(m.add_connection),
            bisection: chance(m.add_node),
            toggle_enabled: chance(m.toggle_enabled),
            keep_disabled: chance(constants::FLAPPY_CROSSOVER_KEEP_DISABLED),
            pick_lesser: chance(constants::FLAPPY_CROSSOVER_PICK_LESSER),
        }
    }
}

impl Probabilities for ProbStatic {
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        match evt {
            EvolutionEvent::MutateWeight => self.mutate_weight,
            EvolutionEvent::ReplaceWeight => self.replace_weight,
            EvolutionEvent::NewConnection => self.new_connection,
            EvolutionEvent::Bisection => self.bisection,
            EvolutionEvent::ToggleEnabled => self.toggle_enabled,
            EvolutionEvent::KeepDisabled => self.keep_disabled,
            EvolutionEvent::PickLesser => self.pick_lesser,
        }
    }
}

/// wyrand, small and fast enough to be rolled for every gene
#[derive(Debug, Clone)]
pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}

/// Ties a set of [Probabilities] to a source of randomness, so that the pair may be handed
/// around as a single `impl Happens`
#[derive(Debug, Clone)]
pub struct ProbBinding<P: Probabilities, R: RngCore> {
    p: P,
    r: R,
}

impl<P: Probabilities, R: RngCore> ProbBinding<P, R> {
    pub fn new(p: P, r: R) -> Self {
        Self { p, r }
    }
}

impl<P: Probabilities, R: RngCore> Probabilities for ProbBinding<P, R> {
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        self.p.probability(evt)
    }
}

impl<P: Probabilities, R: RngCore> RngCore for ProbBinding<P, R> {
    fn next_u32(&mut self) -> u32 {
        self.r.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.r.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.r.fill_bytes(dest)
    }
}

/// The rng the population driver runs on
pub type EvolutionRng = ProbBinding<ProbStatic, WyRng>;

pub fn evolution_rng(mutation: &Mutation, seed: u64) -> EvolutionRng {
    ProbBinding::new(ProbStatic::from(mutation), WyRng::seeded(seed))
}

#[cfg(test)]
pub fn default_rng() -> impl RngCore {
    WyRng::seeded(rand::random())
}

#[cfg(test)]
mod test {
    use super::*;
    use core::iter::once;
    use rand::rngs::ThreadRng;

    const fn percent(x: u64) -> u64 {
        x * (u64::MAX / 100)
    }

    fn assert_within_deviation(
        evt: EvolutionEvent,
        chance: f64,
        range: f64,
        happens: &mut impl Happens,
    ) {
        let samples = 10_000.;
        let expected = chance * samples;
        let max_deviation = expected * range;
        for _ in 0..20 {
            let incidence = once(())
                .cycle()
                .take(samples as usize)
                .filter(|()| happens.happens(evt))
                .count() as f64;
            assert!(
                (expected - incidence).abs() < max_deviation,
                "{evt:?}: {incidence} != {expected} ± {max_deviation}"
            );
        }
    }

    fn expected() -> [(EvolutionEvent, f64); 5] {
        let m = Mutation::default();
        [
            (EvolutionEvent::MutateWeight, m.weight_mutate),
            (EvolutionEvent::ReplaceWeight, m.weight_replace),
            (EvolutionEvent::NewConnection, m.add_connection),
            (EvolutionEvent::Bisection, m.add_node),
            (EvolutionEvent::KeepDisabled, constants::FLAPPY_CROSSOVER_KEEP_DISABLED),
        ]
    }

    // controll test - we are confident that rand generates good random numbers
    #[test]
    fn test_deviation_rand() {
        let mut p_bind = ProbBinding::new(ProbStatic::default(), ThreadRng::default());
        for (evt, chance) in expected() {
            assert_within_deviation(evt, chance, 0.33, &mut p_bind);
        }
    }

    #[test]
    fn test_deviation_wyrand() {
        let mut p_bind = ProbBinding::new(ProbStatic::default(), WyRng::seeded(0x5eed));
        for (evt, chance) in expected() {
            assert_within_deviation(evt, chance, 0.33, &mut p_bind);
        }
    }

    #[test]
    fn test_chance_bounds() {
        assert_eq!(chance(0.), 0);
        assert_eq!(chance(-1.), 0);
        assert_eq!(chance(1.), u64::MAX);
        assert!(chance(0.5) > percent(49) && chance(0.5) < percent(51));
    }

    #[test]
    fn test_overrides_never_and_always() {
        let mut rng = ProbBinding::new(
            ProbStatic::default().with_overrides(&[
                (EvolutionEvent::Bisection, 0),
                (EvolutionEvent::NewConnection, u64::MAX),
            ]),
            WyRng::seeded(7),
        );
        let hits = (0..1_000)
            .filter(|_| rng.happens(EvolutionEvent::NewConnection))
            .count();
        assert!(hits >= 999);
        for _ in 0..1_000 {
            assert!(!rng.happens(EvolutionEvent::Bisection));
        }
    }

    #[test]
    fn test_fill_bytes_odd_length() {
        let mut rng = WyRng::seeded(1);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|b| *b != 0));

        let mut a = WyRng::seeded(99);
        let mut b = WyRng::seeded(99);
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
