//! Configuration sections for the training launch
//!
//! Each struct corresponds to one variable block of the launch: the BERT
//! hyperparameters, batch sizing, optimizer schedule, dataset paths,
//! checkpoint/log intervals, and the distributed launcher topology.
//! Defaults reproduce the single-node BERT-large launch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Model architecture arguments
///
/// Passed to the trainer as the leading `--num-layers .. --max-position-embeddings`
/// flags. `binary_head` is the trainer's next-sentence-prediction head;
/// when disabled the command carries `--bert-no-binary-head`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelArgs {
    /// Number of transformer layers
    pub num_layers: usize,
    /// Hidden size
    pub hidden_size: usize,
    /// Number of attention heads
    pub num_attention_heads: usize,
    /// Sequence length
    pub seq_length: usize,
    /// Maximum number of position embeddings
    pub max_position_embeddings: usize,
    /// Train the binary (next sentence prediction) head
    pub binary_head: bool,
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self {
            num_layers: 24,
            hidden_size: 1024,
            num_attention_heads: 16,
            seq_length: 512,
            max_position_embeddings: 512,
            binary_head: false,
        }
    }
}

/// Batch sizing and schedule length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingArgs {
    /// Batch size per model instance
    pub micro_batch_size: usize,
    /// Aggregate batch size across all data-parallel ranks
    pub global_batch_size: usize,
    /// Total number of training iterations
    pub train_iters: usize,
}

impl Default for TrainingArgs {
    fn default() -> Self {
        Self {
            micro_batch_size: 4,
            global_batch_size: 8,
            train_iters: 2_000_000,
        }
    }
}

/// Optimizer and learning rate schedule arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerArgs {
    /// Peak learning rate
    pub lr: f64,
    /// Learning rate decay schedule
    pub lr_decay_style: DecayStyle,
    /// Number of iterations over which the learning rate decays
    pub lr_decay_iters: usize,
    /// Floor the learning rate decays to
    pub min_lr: f64,
    /// Weight decay coefficient
    pub weight_decay: f64,
    /// Fraction of `lr_decay_iters` spent in linear warmup
    pub lr_warmup_fraction: f64,
    /// Gradient clipping threshold
    pub clip_grad: f64,
    /// Train in fp16 mixed precision
    pub fp16: bool,
}

impl Default for OptimizerArgs {
    fn default() -> Self {
        Self {
            lr: 1.0e-4,
            lr_decay_style: DecayStyle::Linear,
            lr_decay_iters: 990_000,
            min_lr: 1.0e-5,
            weight_decay: 1.0e-2,
            lr_warmup_fraction: 0.01,
            clip_grad: 1.0,
            fp16: true,
        }
    }
}

/// Learning rate decay schedules understood by the trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecayStyle {
    Constant,
    Linear,
    Cosine,
    InverseSquareRoot,
}

impl DecayStyle {
    /// Value rendered after `--lr-decay-style`
    pub fn as_str(&self) -> &'static str {
        match self {
            DecayStyle::Constant => "constant",
            DecayStyle::Linear => "linear",
            DecayStyle::Cosine => "cosine",
            DecayStyle::InverseSquareRoot => "inverse-square-root",
        }
    }
}

impl fmt::Display for DecayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset arguments
///
/// `data_path` is the path and file prefix of the preprocessed corpus,
/// not a file that exists on its own; the trainer derives the index and
/// binary file names from it. Neither path is checked for existence
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataArgs {
    /// Path and file prefix of the preprocessed training corpus
    pub data_path: String,
    /// Vocabulary file for the trainer's tokenizer
    pub vocab_file: String,
    /// Dataset loader implementation
    pub data_impl: DataImpl,
    /// Comma-separated train/validation/test split weights
    pub split: String,
}

impl Default for DataArgs {
    fn default() -> Self {
        Self {
            data_path: String::new(),
            vocab_file: String::new(),
            data_impl: DataImpl::Mmap,
            split: "949,50,1".to_string(),
        }
    }
}

/// Dataset loader implementations understood by the trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataImpl {
    Mmap,
    Lazy,
    Cached,
    Infer,
}

impl DataImpl {
    /// Value rendered after `--data-impl`
    pub fn as_str(&self) -> &'static str {
        match self {
            DataImpl::Mmap => "mmap",
            DataImpl::Lazy => "lazy",
            DataImpl::Cached => "cached",
            DataImpl::Infer => "infer",
        }
    }
}

impl fmt::Display for DataImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checkpoint and logging intervals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputArgs {
    /// Iterations between log lines
    pub log_interval: usize,
    /// Iterations between checkpoint saves
    pub save_interval: usize,
    /// Iterations between validation runs
    pub eval_interval: usize,
    /// Number of iterations per validation run
    pub eval_iters: usize,
    /// Directory the trainer saves checkpoints to
    pub save: String,
    /// Directory the trainer loads checkpoints from; `save` when unset
    pub load: Option<String>,
}

impl Default for OutputArgs {
    fn default() -> Self {
        Self {
            log_interval: 100,
            save_interval: 10_000,
            eval_interval: 1_000,
            eval_iters: 10,
            save: String::new(),
            load: None,
        }
    }
}

impl OutputArgs {
    /// Directory rendered after `--load`, falling back to `save`
    pub fn load_path(&self) -> &str {
        self.load.as_deref().unwrap_or(&self.save)
    }
}

/// Distributed launcher arguments
///
/// The topology fields are rendered as torchrun rendezvous flags only
/// when more than one process is requested; the single-process default
/// invokes the launcher bare, the way the original single-node launch
/// does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchArgs {
    /// Distributed launcher binary
    pub launcher: String,
    /// Training entry point handed to the launcher
    pub script: String,
    /// Number of training processes per node
    pub nproc_per_node: usize,
    /// Number of nodes
    pub nnodes: usize,
    /// Rank of this node
    pub node_rank: usize,
    /// Rendezvous master address
    pub master_addr: String,
    /// Rendezvous master port
    pub master_port: u16,
    /// Extra environment variables set on the training process
    pub env: BTreeMap<String, String>,
}

impl Default for LaunchArgs {
    fn default() -> Self {
        Self {
            launcher: "torchrun".to_string(),
            script: "pretrain_bert.py".to_string(),
            nproc_per_node: 1,
            nnodes: 1,
            node_rank: 0,
            master_addr: "localhost".to_string(),
            master_port: 6000,
            env: BTreeMap::new(),
        }
    }
}

impl LaunchArgs {
    /// Total number of training processes across all nodes
    pub fn world_size(&self) -> usize {
        self.nnodes * self.nproc_per_node
    }
}
