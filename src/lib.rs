// detailed implementation
pub mod config;
pub mod environments;
pub mod error;
pub mod geometry;
pub mod normalizer;
pub mod policies;
pub mod utils;

// Traits
pub mod agent;
pub mod environment;
pub mod policy; // policy trait

pub use error::{GameError, Result};
