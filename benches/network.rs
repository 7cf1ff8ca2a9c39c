#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

use criterion::Criterion;
use flappy::{
    genome::{Genome, InnoGen},
    random::{ProbBinding, ProbStatic, WyRng},
    specie::speciate,
    Activation, FeedForward, Network,
};

fn grown(seed: u64, mutations: usize) -> (Genome, usize) {
    let mut rng = ProbBinding::new(ProbStatic::default(), WyRng::seeded(seed));
    let (mut genome, head) = Genome::fully_connected(3, 1, &mut rng);
    let mut inno = InnoGen::new(head);
    for _ in 0..mutations {
        genome.mutate(&mut rng, &mut inno);
    }
    (genome, inno.head)
}

fn bench_network(bench: &mut Criterion) {
    let (genome, _) = grown(7, 200);
    let σ = Activation::Tanh;
    bench.bench_function("feedforward-build", |b| {
        b.iter(|| FeedForward::from_genome(&genome, σ))
    });

    let mut nn = FeedForward::from_genome(&genome, σ);
    let input = [350., 50., 150.];
    bench.bench_function("feedforward-activate", |b| b.iter(|| nn.activate(&input)[0]));
}

fn bench_speciate(bench: &mut Criterion) {
    let genomes = (0..100)
        .map(|seed| grown(seed, 20).0)
        .collect::<Vec<_>>();
    bench.bench_function("speciate-100", |b| {
        b.iter(|| {
            let mut species = vec![];
            let mut next = 0;
            speciate(&mut species, &genomes, 3.0, &mut next, 0);
            species.len()
        })
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_network(&mut criterion);
    bench_speciate(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
