//! Runtime configuration. Every field has a default, so an empty JSON object (or no file at
//! all) is a valid configuration.

use crate::network::Activation;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub neat: Neat,
    pub training: Training,
    pub display: Display,
    /// Seed for pipe heights and evolution; drawn at random when absent
    pub seed: Option<u64>,
}

/// Population, speciation and reproduction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neat {
    pub population: usize,
    /// Training stops once any genome reaches this fitness
    pub fitness_threshold: Option<f64>,
    pub compatibility_threshold: f64,
    /// Generations a specie may go without improving before it is culled
    pub max_stagnation: usize,
    /// Number of best species protected from stagnation culls
    pub species_elitism: usize,
    /// Number of champions copied unchanged into each specie's next generation
    pub elitism: usize,
    /// Fraction of each specie allowed to breed
    pub survival_threshold: f64,
    pub activation: Activation,
    pub mutation: Mutation,
}

impl Default for Neat {
    fn default() -> Self {
        Self {
            population: 50,
            fitness_threshold: Some(100.),
            compatibility_threshold: 3.0,
            max_stagnation: 20,
            species_elitism: 2,
            elitism: 2,
            survival_threshold: 0.2,
            activation: Activation::Tanh,
            mutation: Mutation::default(),
        }
    }
}

/// Probabilities of each mutation, all in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mutation {
    pub weight_mutate: f64,
    pub weight_replace: f64,
    pub add_connection: f64,
    pub add_node: f64,
    pub toggle_enabled: f64,
}

impl Default for Mutation {
    fn default() -> Self {
        Self {
            weight_mutate: 0.8,
            weight_replace: 0.1,
            add_connection: 0.5,
            add_node: 0.2,
            toggle_enabled: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Training {
    pub generations: usize,
    /// End a generation early after this many ticks
    pub tick_limit: Option<usize>,
    /// End a generation early once this many pipes are cleared
    pub score_limit: Option<usize>,
}

impl Default for Training {
    fn default() -> Self {
        Self {
            generations: 50,
            tick_limit: None,
            score_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    pub fps: u32,
    /// Draw each bird's line of sight to the pipe it is aiming for
    pub sight_lines: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            fps: 30,
            sight_lines: false,
        }
    }
}

impl Config {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let neat = &self.neat;
        if neat.population == 0 {
            return Err(ConfigError::Invalid("population must be non-zero".into()));
        }
        if !(0. ..=1.).contains(&neat.survival_threshold) {
            return Err(ConfigError::Invalid(format!(
                "survival_threshold {} is outside [0, 1]",
                neat.survival_threshold
            )));
        }
        let m = &neat.mutation;
        for (name, p) in [
            ("weight_mutate", m.weight_mutate),
            ("weight_replace", m.weight_replace),
            ("add_connection", m.add_connection),
            ("add_node", m.add_node),
            ("toggle_enabled", m.toggle_enabled),
        ] {
            if !(0. ..=1.).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "mutation.{name} {p} is outside [0, 1]"
                )));
            }
        }
        if self.display.fps == 0 {
            return Err(ConfigError::Invalid("fps must be non-zero".into()));
        }
        Ok(())
    }
}
