//! taxelview library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod config;
pub mod heatmap;
pub mod protocol;
pub mod render;
pub mod serial;
pub mod term;
pub mod viewer;
