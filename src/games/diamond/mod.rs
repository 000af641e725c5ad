//! Diamond Triangles: draw lattice edges, close triangles, score.

pub mod ai;
pub mod errors;
pub mod lattice;
pub mod moves;
pub mod plugin;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod types;
