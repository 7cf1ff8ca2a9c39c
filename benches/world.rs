use criterion::Criterion;
use flappy::game::{Bird, World};
use slotmap::{DefaultKey, SlotMap};

/// A flock hovering in place, so it survives long enough to meet every pipe
fn hover(flock: &mut SlotMap<DefaultKey, Bird>) {
    for bird in flock.values_mut() {
        if bird.y() > 380. {
            bird.jump();
        }
        bird.advance_tick();
    }
}

fn bench_step(bench: &mut Criterion) {
    bench.bench_function("world-step-50", |b| {
        b.iter(|| {
            let mut world = World::new(0);
            let mut flock = SlotMap::new();
            for _ in 0..50 {
                flock.insert(Bird::default());
            }
            for _ in 0..2_000 {
                if flock.is_empty() {
                    break;
                }
                hover(&mut flock);
                world.step(&mut flock);
            }
            world.score()
        })
    });
}

fn bench_collision(bench: &mut Criterion) {
    let world = World::new(3);
    let pipe = &world.pipes()[0];
    let bird = Bird::new(pipe.x(), pipe.bottom() - 24.);
    bench.bench_function("pipe-collides", |b| {
        b.iter(|| pipe.collides_with(&bird, world.sprites()))
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(100)
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
    bench_step(&mut criterion);
    bench_collision(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
