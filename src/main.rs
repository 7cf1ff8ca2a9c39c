use anyhow::{Context, Result};
use clap::Parser;
use flappy::{
    frontend::{
        headless,
        terminal::{Keyboard, Terminal},
        FixedRate, Frontend, NoInput,
    },
    population::Stop,
    App, Config,
};
use std::{fs::File, path::PathBuf, sync::Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flappy")]
#[command(about = "Play Flappy Bird in the terminal, or watch NEAT learn to play it")]
struct Args {
    /// JSON config; every field is optional
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for pipe heights and evolution, overriding the config
    #[arg(long)]
    seed: Option<u64>,
    /// Train without a display, logging progress to stderr
    #[arg(long)]
    headless: bool,
    /// Generation limit, overriding the config
    #[arg(long)]
    generations: Option<usize>,
    /// Where to write the best genome after training
    #[arg(long)]
    champion: Option<PathBuf>,
    /// Log file for interactive sessions, which own the terminal
    #[arg(long, default_value = "flappy.log")]
    log: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(generations) = args.generations {
        config.training.generations = generations;
    }
    config.validate()?;
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    info!(seed, headless = args.headless, "starting");

    if args.headless {
        let mut app = App::new(headless(NoInput), config, seed);
        if let Some(path) = &args.champion {
            app = app.with_champion_path(path);
        }
        let evolved = app.train().context("training failed")?;
        let best = evolved.champion.map(|c| c.fitness);
        match evolved.stop {
            Stop::Fitness => info!(generations = evolved.generations, best, "fitness threshold met"),
            _ => info!(generations = evolved.generations, best, "generation limit reached"),
        }
        return Ok(());
    }

    let (fps, sight_lines) = (config.display.fps, config.display.sight_lines);
    let terminal = Terminal::enter().context("failed to take over the terminal")?;
    let frontend =
        Frontend::new(terminal, Keyboard, FixedRate::new(fps)).with_sight_lines(sight_lines);
    let mut app = App::new(frontend, config, seed);
    if let Some(path) = &args.champion {
        app = app.with_champion_path(path);
    }
    app.run()?;
    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let subscriber = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if args.headless {
        subscriber.with_writer(std::io::stderr).init();
    } else {
        let log = File::create(&args.log)
            .with_context(|| format!("failed to create log file {}", args.log.display()))?;
        subscriber.with_ansi(false).with_writer(Mutex::new(log)).init();
    }
    Ok(())
}
