//! Launcher binary for Megatron-style BERT pretraining
//!
//! Resolves a launch configuration from defaults, an optional JSON
//! config file, and CLI overrides, then assembles the trainer command
//! line, spawns the distributed launcher, and propagates its exit code.
//!
//! # Usage
//!
//! ```bash
//! bertrun \
//!   --data-path ./data/bert_text_sentence \
//!   --vocab-file ./data/bert-vocab.txt \
//!   --checkpoint-path ./checkpoints/bert \
//!   [--config launch.json] \
//!   [--preset bert-base|bert-large] \
//!   [--dry-run]
//! ```

use anyhow::{Context, Result};
use bertrun::plan::LaunchPlan;
use bertrun::runner;
use bertrun::summary::render_summary;
use bertrun_config::{DataImpl, DecayStyle, LaunchConfig, ModelPreset};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Launcher for Megatron-style BERT pretraining
#[derive(Parser, Debug)]
#[command(name = "bertrun")]
#[command(about = "Assemble and launch a BERT pretraining run", long_about = None)]
struct Args {
    /// Path to a JSON launch configuration file; flags override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Named architecture applied before individual model overrides
    #[arg(long, value_enum, value_name = "PRESET")]
    preset: Option<PresetFlag>,

    /// Path and file prefix of the preprocessed training data (required)
    #[arg(long, value_name = "PATH")]
    data_path: Option<String>,

    /// Vocabulary file for the trainer's tokenizer (required)
    #[arg(long, value_name = "PATH")]
    vocab_file: Option<String>,

    /// Checkpoint directory, used for both saving and loading (required)
    #[arg(long, value_name = "PATH")]
    checkpoint_path: Option<String>,

    /// Checkpoint directory to load from, when different from --checkpoint-path
    #[arg(long, value_name = "PATH")]
    load: Option<String>,

    /// Number of transformer layers
    #[arg(long, value_name = "N")]
    num_layers: Option<usize>,

    /// Hidden size
    #[arg(long, value_name = "N")]
    hidden_size: Option<usize>,

    /// Number of attention heads
    #[arg(long, value_name = "N")]
    num_attention_heads: Option<usize>,

    /// Sequence length
    #[arg(long, value_name = "N")]
    seq_length: Option<usize>,

    /// Maximum number of position embeddings
    #[arg(long, value_name = "N")]
    max_position_embeddings: Option<usize>,

    /// Train the binary (next sentence prediction) head
    #[arg(long)]
    bert_binary_head: bool,

    /// Batch size per model instance
    #[arg(long, value_name = "N")]
    micro_batch_size: Option<usize>,

    /// Aggregate batch size across all data-parallel ranks
    #[arg(long, value_name = "N")]
    global_batch_size: Option<usize>,

    /// Total number of training iterations
    #[arg(long, value_name = "N")]
    train_iters: Option<usize>,

    /// Peak learning rate
    #[arg(long, value_name = "LR")]
    lr: Option<f64>,

    /// Learning rate decay schedule
    #[arg(long, value_enum, value_name = "STYLE")]
    lr_decay_style: Option<DecayStyleFlag>,

    /// Number of iterations over which the learning rate decays
    #[arg(long, value_name = "N")]
    lr_decay_iters: Option<usize>,

    /// Floor the learning rate decays to
    #[arg(long, value_name = "LR")]
    min_lr: Option<f64>,

    /// Weight decay coefficient
    #[arg(long, value_name = "WD")]
    weight_decay: Option<f64>,

    /// Fraction of decay iterations spent in linear warmup
    #[arg(long, value_name = "FRAC")]
    lr_warmup_fraction: Option<f64>,

    /// Gradient clipping threshold
    #[arg(long, value_name = "NORM")]
    clip_grad: Option<f64>,

    /// Computation precision
    #[arg(long, value_enum, value_name = "PREC")]
    precision: Option<PrecisionFlag>,

    /// Dataset loader implementation
    #[arg(long, value_enum, value_name = "IMPL")]
    data_impl: Option<DataImplFlag>,

    /// Comma-separated train/validation/test split weights
    #[arg(long, value_name = "WEIGHTS")]
    split: Option<String>,

    /// Iterations between log lines
    #[arg(long, value_name = "N")]
    log_interval: Option<usize>,

    /// Iterations between checkpoint saves
    #[arg(long, value_name = "N")]
    save_interval: Option<usize>,

    /// Iterations between validation runs
    #[arg(long, value_name = "N")]
    eval_interval: Option<usize>,

    /// Number of iterations per validation run
    #[arg(long, value_name = "N")]
    eval_iters: Option<usize>,

    /// Distributed launcher binary
    #[arg(long, value_name = "BIN")]
    launcher: Option<String>,

    /// Training entry point handed to the launcher
    #[arg(long, value_name = "SCRIPT")]
    script: Option<String>,

    /// Number of training processes per node
    #[arg(long, value_name = "N")]
    nproc_per_node: Option<usize>,

    /// Number of nodes
    #[arg(long, value_name = "N")]
    nnodes: Option<usize>,

    /// Rank of this node
    #[arg(long, value_name = "RANK")]
    node_rank: Option<usize>,

    /// Rendezvous master address
    #[arg(long, value_name = "ADDR")]
    master_addr: Option<String>,

    /// Rendezvous master port
    #[arg(long, value_name = "PORT")]
    master_port: Option<u16>,

    /// Extra environment variable for the training process (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair,
        action = clap::ArgAction::Append)]
    env: Vec<(String, String)>,

    /// Print the assembled invocation and exit without launching
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PresetFlag {
    BertBase,
    BertLarge,
}

impl From<PresetFlag> for ModelPreset {
    fn from(value: PresetFlag) -> Self {
        match value {
            PresetFlag::BertBase => ModelPreset::BertBase,
            PresetFlag::BertLarge => ModelPreset::BertLarge,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DecayStyleFlag {
    Constant,
    Linear,
    Cosine,
    InverseSquareRoot,
}

impl From<DecayStyleFlag> for DecayStyle {
    fn from(value: DecayStyleFlag) -> Self {
        match value {
            DecayStyleFlag::Constant => DecayStyle::Constant,
            DecayStyleFlag::Linear => DecayStyle::Linear,
            DecayStyleFlag::Cosine => DecayStyle::Cosine,
            DecayStyleFlag::InverseSquareRoot => DecayStyle::InverseSquareRoot,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DataImplFlag {
    Mmap,
    Lazy,
    Cached,
    Infer,
}

impl From<DataImplFlag> for DataImpl {
    fn from(value: DataImplFlag) -> Self {
        match value {
            DataImplFlag::Mmap => DataImpl::Mmap,
            DataImplFlag::Lazy => DataImpl::Lazy,
            DataImplFlag::Cached => DataImpl::Cached,
            DataImplFlag::Infer => DataImpl::Infer,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PrecisionFlag {
    Fp16,
    Fp32,
}

/// Parse a KEY=VALUE pair for --env
fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

/// Resolve the launch configuration: config file first, then preset,
/// then individual flag overrides
fn build_config(args: &Args) -> Result<LaunchConfig> {
    let mut config = match &args.config {
        Some(path) => LaunchConfig::from_file(path)?,
        None => LaunchConfig::default(),
    };

    if let Some(preset) = args.preset {
        ModelPreset::from(preset).apply(&mut config.model);
    }

    if let Some(num_layers) = args.num_layers {
        config.model.num_layers = num_layers;
    }
    if let Some(hidden_size) = args.hidden_size {
        config.model.hidden_size = hidden_size;
    }
    if let Some(num_attention_heads) = args.num_attention_heads {
        config.model.num_attention_heads = num_attention_heads;
    }
    if let Some(seq_length) = args.seq_length {
        config.model.seq_length = seq_length;
    }
    if let Some(max_position_embeddings) = args.max_position_embeddings {
        config.model.max_position_embeddings = max_position_embeddings;
    }
    if args.bert_binary_head {
        config.model.binary_head = true;
    }

    if let Some(micro_batch_size) = args.micro_batch_size {
        config.training.micro_batch_size = micro_batch_size;
    }
    if let Some(global_batch_size) = args.global_batch_size {
        config.training.global_batch_size = global_batch_size;
    }
    if let Some(train_iters) = args.train_iters {
        config.training.train_iters = train_iters;
    }

    if let Some(lr) = args.lr {
        config.optimizer.lr = lr;
    }
    if let Some(lr_decay_style) = args.lr_decay_style {
        config.optimizer.lr_decay_style = lr_decay_style.into();
    }
    if let Some(lr_decay_iters) = args.lr_decay_iters {
        config.optimizer.lr_decay_iters = lr_decay_iters;
    }
    if let Some(min_lr) = args.min_lr {
        config.optimizer.min_lr = min_lr;
    }
    if let Some(weight_decay) = args.weight_decay {
        config.optimizer.weight_decay = weight_decay;
    }
    if let Some(lr_warmup_fraction) = args.lr_warmup_fraction {
        config.optimizer.lr_warmup_fraction = lr_warmup_fraction;
    }
    if let Some(clip_grad) = args.clip_grad {
        config.optimizer.clip_grad = clip_grad;
    }
    if let Some(precision) = args.precision {
        config.optimizer.fp16 = matches!(precision, PrecisionFlag::Fp16);
    }

    if let Some(data_path) = &args.data_path {
        config.data.data_path = data_path.clone();
    }
    if let Some(vocab_file) = &args.vocab_file {
        config.data.vocab_file = vocab_file.clone();
    }
    if let Some(data_impl) = args.data_impl {
        config.data.data_impl = data_impl.into();
    }
    if let Some(split) = &args.split {
        config.data.split = split.clone();
    }

    if let Some(log_interval) = args.log_interval {
        config.output.log_interval = log_interval;
    }
    if let Some(save_interval) = args.save_interval {
        config.output.save_interval = save_interval;
    }
    if let Some(eval_interval) = args.eval_interval {
        config.output.eval_interval = eval_interval;
    }
    if let Some(eval_iters) = args.eval_iters {
        config.output.eval_iters = eval_iters;
    }
    if let Some(checkpoint_path) = &args.checkpoint_path {
        config.output.save = checkpoint_path.clone();
    }
    if let Some(load) = &args.load {
        config.output.load = Some(load.clone());
    }

    if let Some(launcher) = &args.launcher {
        config.launch.launcher = launcher.clone();
    }
    if let Some(script) = &args.script {
        config.launch.script = script.clone();
    }
    if let Some(nproc_per_node) = args.nproc_per_node {
        config.launch.nproc_per_node = nproc_per_node;
    }
    if let Some(nnodes) = args.nnodes {
        config.launch.nnodes = nnodes;
    }
    if let Some(node_rank) = args.node_rank {
        config.launch.node_rank = node_rank;
    }
    if let Some(master_addr) = &args.master_addr {
        config.launch.master_addr = master_addr.clone();
    }
    if let Some(master_port) = args.master_port {
        config.launch.master_port = master_port;
    }
    for (key, value) in &args.env {
        config.launch.env.insert(key.clone(), value.clone());
    }

    Ok(config)
}

/// Best-effort existence warning; the trainer owns path validation and
/// `data_path` is a prefix rather than a file
fn warn_missing_files(config: &LaunchConfig) {
    if !config.data.vocab_file.is_empty() && !Path::new(&config.data.vocab_file).exists() {
        warn!(
            vocab_file = %config.data.vocab_file,
            "vocab file not found; the trainer may fail to start"
        );
    }
}

fn run() -> Result<i32> {
    let args = Args::parse();
    let config = build_config(&args)?;

    if args.print_config {
        let json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize launch config")?;
        println!("{json}");
        return Ok(0);
    }

    config.validate().context("Invalid launch configuration")?;
    warn_missing_files(&config);

    let plan = LaunchPlan::from_config(&config);

    if args.dry_run {
        println!("{plan}");
        return Ok(0);
    }

    print!("{}", render_summary(&config));
    info!(
        launcher = %plan.program,
        world_size = config.launch.world_size(),
        "launching training process"
    );
    let code = runner::run(&plan)?;
    info!(code, "training process exited");
    Ok(code)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bertrun=info".parse().expect("Directive is valid")),
        )
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("bertrun: {err:#}");
            std::process::exit(1);
        }
    }
}
