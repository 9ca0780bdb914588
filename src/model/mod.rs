//! Persisted and exchanged records

pub mod cave;
pub mod game;

pub use cave::{Cave, CavePatch, PathScheme};
pub use game::{version_name, Build, Game, Upload};
