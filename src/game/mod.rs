//! The simulation: birds, pipes, ground and the per-tick world step shared by human play and
//! training.

pub mod base;
pub mod bird;
pub mod mask;
pub mod pipe;
pub mod world;

pub use base::Base;
pub use bird::Bird;
pub use mask::{Mask, Sprites};
pub use pipe::Pipe;
pub use world::{Flier, Tick, World};
