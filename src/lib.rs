#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

pub mod macros;

pub mod app;
pub mod config;
pub mod constants;
pub mod crossover;
pub mod error;
pub mod frontend;
pub mod game;
pub mod genome;
pub mod harness;
pub mod network;
pub mod play;
pub mod population;
pub mod random;
pub mod reproduce;
pub mod specie;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use genome::Genome;
pub use network::{activate, Activation, FeedForward, Network};
pub use population::{Member, Population};
pub use random::{Happens, Probabilities};
pub use specie::Specie;
