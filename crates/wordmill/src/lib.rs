#![doc = include_str!("../README.md")]

mod alphabet;
mod assignment;
mod cancel;
mod config;
mod coverage;
mod encoder;
mod error;
mod producer;
mod queue;
mod scheduler;
mod worker;

pub use crate::alphabet::*;
pub use crate::assignment::*;
pub use crate::cancel::*;
pub use crate::config::*;
pub use crate::coverage::*;
pub use crate::encoder::*;
pub use crate::error::*;
pub use crate::producer::*;
pub use crate::queue::*;
pub use crate::scheduler::*;
pub use crate::worker::*;

// Index type of every public API.
pub use num_bigint::BigUint;
