//! Typed launch configuration for Megatron-style BERT pretraining
//!
//! This crate provides:
//! - Configuration sections mirroring the launch variable blocks
//! - Defaults matching the single-node BERT-large launch
//! - JSON config file loading
//! - Structural validation with typed errors
//! - Named model architecture presets
//!
//! # Example
//!
//! ```
//! use bertrun_config::{LaunchConfig, ModelPreset};
//!
//! let mut config = LaunchConfig::default();
//! ModelPreset::BertBase.apply(&mut config.model);
//! config.data.data_path = "/data/bert_text_sentence".to_string();
//! config.data.vocab_file = "/data/bert-vocab.txt".to_string();
//! config.output.save = "/checkpoints/bert".to_string();
//! config.validate().expect("Config should validate");
//! ```

pub mod config;
pub mod preset;
pub mod sections;

// Public API exports

/// Root configuration and validation errors
///
/// `LaunchConfig` groups the sections below and is the unit of file
/// loading, validation, and command assembly.
pub use config::{ConfigError, LaunchConfig};

/// Named model architectures
///
/// Presets overwrite the architecture fields of a `ModelArgs` with the
/// published BERT sizes.
pub use preset::ModelPreset;

/// Configuration sections
///
/// One struct per variable block of the launch: model shape, batch
/// sizing, optimizer schedule, dataset paths, checkpoint/log intervals,
/// and launcher topology.
pub use sections::{
    DataArgs, DataImpl, DecayStyle, LaunchArgs, ModelArgs, OptimizerArgs, OutputArgs, TrainingArgs,
};
