//! Root launch configuration: file loading and validation
//!
//! [`LaunchConfig`] groups the launch sections, loads from JSON files,
//! and performs the structural checks a launch must pass before the
//! command line is assembled. Path existence is deliberately not
//! checked; the trainer owns file validation.

use crate::sections::{DataArgs, LaunchArgs, ModelArgs, OptimizerArgs, OutputArgs, TrainingArgs};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors reported by [`LaunchConfig::validate`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be nonzero")]
    ZeroField { field: &'static str },
    #[error("hidden size {hidden_size} is not divisible by {num_attention_heads} attention heads")]
    IndivisibleHiddenSize {
        hidden_size: usize,
        num_attention_heads: usize,
    },
    #[error("seq length {seq_length} exceeds max position embeddings {max_position_embeddings}")]
    SeqLengthExceedsPositions {
        seq_length: usize,
        max_position_embeddings: usize,
    },
    #[error(
        "global batch size {global_batch_size} is not divisible by micro batch size {micro_batch_size}"
    )]
    IndivisibleGlobalBatch {
        global_batch_size: usize,
        micro_batch_size: usize,
    },
    #[error("lr must be positive, got {lr}")]
    NonPositiveLr { lr: f64 },
    #[error("min lr {min_lr} exceeds lr {lr}")]
    MinLrExceedsLr { min_lr: f64, lr: f64 },
    #[error("lr warmup fraction must lie in [0, 1], got {value}")]
    WarmupFractionOutOfRange { value: f64 },
    #[error("{field} must not be negative, got {value}")]
    NegativeField { field: &'static str, value: f64 },
    #[error("lr decay iters {lr_decay_iters} exceed train iters {train_iters}")]
    DecayItersExceedTrainIters {
        lr_decay_iters: usize,
        train_iters: usize,
    },
    #[error("split must be a comma-separated list of integers, got {split:?}")]
    InvalidSplit { split: String },
    #[error("{field} is required")]
    MissingPath { field: &'static str },
    #[error("node rank {node_rank} is out of range for {nnodes} nodes")]
    NodeRankOutOfRange { node_rank: usize, nnodes: usize },
}

/// Complete launch configuration
///
/// The sections correspond to the variable blocks of the launch and
/// serialize as one JSON object per section. Every field carries a
/// default, so config files may specify only the fields they change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Model architecture
    pub model: ModelArgs,
    /// Batch sizing and schedule length
    pub training: TrainingArgs,
    /// Optimizer and learning rate schedule
    pub optimizer: OptimizerArgs,
    /// Dataset paths and loader choice
    pub data: DataArgs,
    /// Checkpoint and logging intervals
    pub output: OutputArgs,
    /// Launcher binary and process topology
    pub launch: LaunchArgs,
}

impl LaunchConfig {
    /// Load a launch configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the JSON configuration file
    ///
    /// # Returns
    /// Loaded configuration or an error if the file cannot be read or
    /// parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: LaunchConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Check the structural invariants of the launch
    ///
    /// Returns the first violated rule. Paths are only checked for
    /// presence, never for existence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("num_layers", self.model.num_layers),
            ("hidden_size", self.model.hidden_size),
            ("num_attention_heads", self.model.num_attention_heads),
            ("seq_length", self.model.seq_length),
            (
                "max_position_embeddings",
                self.model.max_position_embeddings,
            ),
            ("micro_batch_size", self.training.micro_batch_size),
            ("global_batch_size", self.training.global_batch_size),
            ("train_iters", self.training.train_iters),
            ("nproc_per_node", self.launch.nproc_per_node),
            ("nnodes", self.launch.nnodes),
            ("master_port", self.launch.master_port as usize),
        ];
        for (field, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::ZeroField { field });
            }
        }

        if self.model.hidden_size % self.model.num_attention_heads != 0 {
            return Err(ConfigError::IndivisibleHiddenSize {
                hidden_size: self.model.hidden_size,
                num_attention_heads: self.model.num_attention_heads,
            });
        }
        if self.model.seq_length > self.model.max_position_embeddings {
            return Err(ConfigError::SeqLengthExceedsPositions {
                seq_length: self.model.seq_length,
                max_position_embeddings: self.model.max_position_embeddings,
            });
        }
        if self.training.global_batch_size % self.training.micro_batch_size != 0 {
            return Err(ConfigError::IndivisibleGlobalBatch {
                global_batch_size: self.training.global_batch_size,
                micro_batch_size: self.training.micro_batch_size,
            });
        }

        if self.optimizer.lr <= 0.0 {
            return Err(ConfigError::NonPositiveLr {
                lr: self.optimizer.lr,
            });
        }
        if self.optimizer.min_lr > self.optimizer.lr {
            return Err(ConfigError::MinLrExceedsLr {
                min_lr: self.optimizer.min_lr,
                lr: self.optimizer.lr,
            });
        }
        if !(0.0..=1.0).contains(&self.optimizer.lr_warmup_fraction) {
            return Err(ConfigError::WarmupFractionOutOfRange {
                value: self.optimizer.lr_warmup_fraction,
            });
        }
        if self.optimizer.clip_grad < 0.0 {
            return Err(ConfigError::NegativeField {
                field: "clip_grad",
                value: self.optimizer.clip_grad,
            });
        }
        if self.optimizer.weight_decay < 0.0 {
            return Err(ConfigError::NegativeField {
                field: "weight_decay",
                value: self.optimizer.weight_decay,
            });
        }
        if self.optimizer.lr_decay_iters > self.training.train_iters {
            return Err(ConfigError::DecayItersExceedTrainIters {
                lr_decay_iters: self.optimizer.lr_decay_iters,
                train_iters: self.training.train_iters,
            });
        }

        if !valid_split(&self.data.split) {
            return Err(ConfigError::InvalidSplit {
                split: self.data.split.clone(),
            });
        }
        if self.data.data_path.is_empty() {
            return Err(ConfigError::MissingPath { field: "data_path" });
        }
        if self.data.vocab_file.is_empty() {
            return Err(ConfigError::MissingPath {
                field: "vocab_file",
            });
        }
        if self.output.save.is_empty() {
            return Err(ConfigError::MissingPath { field: "save" });
        }

        if self.launch.node_rank >= self.launch.nnodes {
            return Err(ConfigError::NodeRankOutOfRange {
                node_rank: self.launch.node_rank,
                nnodes: self.launch.nnodes,
            });
        }

        Ok(())
    }
}

/// A split is a non-empty comma-separated list of integer weights,
/// e.g. `949,50,1`
fn valid_split(split: &str) -> bool {
    !split.is_empty() && split.split(',').all(|part| part.parse::<u64>().is_ok())
}
