//! Event Fusion Engine
//!
//! Merges the per-cycle output of every detection layer into one ranked list:
//! - Layer 1: known objects from the learned detector
//! - Layer 2: level changes (stairs, curbs, fences)
//! - Layer 3: generic obstacles, when enabled
//!
//! The fused list drives the announcement scheduler.

pub mod convert;
pub mod rank;

pub use convert::{LayerConverter, OBSTACLE_LABEL};
pub use rank::{fuse, rank, MAX_FUSED};
