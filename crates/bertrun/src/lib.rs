//! Launcher for Megatron-style BERT pretraining
//!
//! This crate turns a [`bertrun_config::LaunchConfig`] into a running
//! training process:
//! - [`plan`] assembles the launcher command line and environment
//! - [`runner`] spawns it and propagates the exit status
//! - [`summary`] renders the pre-launch parameter table
//!
//! The `bertrun` binary wires these together behind a flat CLI.

pub mod plan;
pub mod runner;
pub mod summary;

// Public API exports

/// Assembled launcher invocation
///
/// Program name, argument tokens in render order, and the environment
/// pairs set on the child before exec.
pub use plan::LaunchPlan;
