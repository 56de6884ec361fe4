//! Dashboard output formats.
//!
//! This module renders a finished dashboard as HTML, JSON or Markdown.

pub mod generator;

pub use generator::*;
