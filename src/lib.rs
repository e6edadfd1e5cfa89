//! **mazes3d** generates perfect mazes over a 3D lattice of cells with randomized Prim's
//! algorithm, a time slice at a time, and turns the result into wall and floor placements.
//!
//! A [`generation::MazeGenerator`] owns each run. [`generation::MazeGenerator::generate`] emits
//! the outer shell straight away and hands back a [`generation::GenerationPass`] that the
//! caller's frame loop resumes until the maze is complete.

pub mod cells;
pub mod clock;
pub mod errors;
pub mod generation;
pub mod generators;
pub mod lattice;
pub mod lattice_dimensions;
pub mod partitions;
pub mod scheduler;
pub mod units;
mod utils;
