//! Dashboard assembly.
//!
//! This module turns a loaded dataset into chart configs and table rows
//! and hands them to the rendering collaborators.

pub mod builder;
pub mod presenter;

pub use builder::{load_and_render, RenderOutcome};
