//! Command assembly for the training invocation
//!
//! Renders a [`LaunchConfig`] into the launcher command line. The flag
//! order follows the original launch: rendezvous flags (multi-process
//! topologies only), the training script, then the BERT, data, and
//! output flag groups. Values pass through verbatim with no quoting or
//! canonicalization.

use bertrun_config::{DataArgs, LaunchArgs, LaunchConfig, OutputArgs};
use std::fmt;
use std::process::Command;

/// Environment variable pinned on every launch
pub const CUDA_MAX_CONNECTIONS_VAR: &str = "CUDA_DEVICE_MAX_CONNECTIONS";

/// Value the trainer expects for [`CUDA_MAX_CONNECTIONS_VAR`]
pub const CUDA_MAX_CONNECTIONS_VALUE: &str = "1";

/// A fully assembled launcher invocation
///
/// `args` holds every token after the program name; `env` holds the
/// KEY=VALUE pairs applied to the child before exec, the pinned CUDA
/// variable first. `Display` renders a one-line shell-style preview for
/// dry runs and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Launcher binary, e.g. `torchrun`
    pub program: String,
    /// Argument tokens in render order
    pub args: Vec<String>,
    /// Environment pairs set on the child
    pub env: Vec<(String, String)>,
}

impl LaunchPlan {
    /// Assemble the invocation for `config`
    ///
    /// Equal configs produce identical plans.
    pub fn from_config(config: &LaunchConfig) -> Self {
        let mut args = rendezvous_args(&config.launch);
        args.push(config.launch.script.clone());
        args.extend(bert_args(config));
        args.extend(data_args(&config.data));
        args.extend(output_args(&config.output));

        let mut env = vec![(
            CUDA_MAX_CONNECTIONS_VAR.to_string(),
            CUDA_MAX_CONNECTIONS_VALUE.to_string(),
        )];
        for (key, value) in &config.launch.env {
            env.push((key.clone(), value.clone()));
        }

        Self {
            program: config.launch.launcher.clone(),
            args,
            env,
        }
    }

    /// Build the process command with arguments and environment applied
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Torchrun process-group flags, rendered only when more than one
/// process is requested; torchrun spells these with underscores
fn rendezvous_args(launch: &LaunchArgs) -> Vec<String> {
    if launch.world_size() <= 1 {
        return Vec::new();
    }
    let mut args = Vec::new();
    push_arg(&mut args, "--nproc_per_node", launch.nproc_per_node);
    push_arg(&mut args, "--nnodes", launch.nnodes);
    push_arg(&mut args, "--node_rank", launch.node_rank);
    push_arg(&mut args, "--master_addr", &launch.master_addr);
    push_arg(&mut args, "--master_port", launch.master_port);
    args
}

/// The BERT flag group: model shape, batch sizing, and optimizer
/// schedule, in the order the launch script lists them
fn bert_args(config: &LaunchConfig) -> Vec<String> {
    let model = &config.model;
    let training = &config.training;
    let optimizer = &config.optimizer;

    let mut args = Vec::new();
    push_arg(&mut args, "--num-layers", model.num_layers);
    push_arg(&mut args, "--hidden-size", model.hidden_size);
    push_arg(&mut args, "--num-attention-heads", model.num_attention_heads);
    push_arg(&mut args, "--seq-length", model.seq_length);
    push_arg(
        &mut args,
        "--max-position-embeddings",
        model.max_position_embeddings,
    );
    push_arg(&mut args, "--micro-batch-size", training.micro_batch_size);
    push_arg(&mut args, "--global-batch-size", training.global_batch_size);
    push_float(&mut args, "--lr", optimizer.lr);
    push_arg(&mut args, "--train-iters", training.train_iters);
    push_arg(&mut args, "--lr-decay-iters", optimizer.lr_decay_iters);
    push_arg(&mut args, "--lr-decay-style", optimizer.lr_decay_style);
    push_float(&mut args, "--min-lr", optimizer.min_lr);
    push_float(&mut args, "--weight-decay", optimizer.weight_decay);
    push_float(&mut args, "--lr-warmup-fraction", optimizer.lr_warmup_fraction);
    push_float(&mut args, "--clip-grad", optimizer.clip_grad);
    if optimizer.fp16 {
        args.push("--fp16".to_string());
    }
    if !model.binary_head {
        args.push("--bert-no-binary-head".to_string());
    }
    args
}

/// The data flag group: corpus prefix, vocabulary, loader, split
fn data_args(data: &DataArgs) -> Vec<String> {
    let mut args = Vec::new();
    push_arg(&mut args, "--data-path", &data.data_path);
    push_arg(&mut args, "--vocab-file", &data.vocab_file);
    push_arg(&mut args, "--data-impl", data.data_impl);
    push_arg(&mut args, "--split", &data.split);
    args
}

/// The output flag group: intervals and checkpoint directories
fn output_args(output: &OutputArgs) -> Vec<String> {
    let mut args = Vec::new();
    push_arg(&mut args, "--log-interval", output.log_interval);
    push_arg(&mut args, "--save-interval", output.save_interval);
    push_arg(&mut args, "--eval-interval", output.eval_interval);
    push_arg(&mut args, "--eval-iters", output.eval_iters);
    push_arg(&mut args, "--save", &output.save);
    push_arg(&mut args, "--load", output.load_path());
    args
}

fn push_arg(args: &mut Vec<String>, flag: &str, value: impl fmt::Display) {
    args.push(flag.to_string());
    args.push(value.to_string());
}

fn push_float(args: &mut Vec<String>, flag: &str, value: f64) {
    args.push(flag.to_string());
    args.push(format_float(value));
}

/// Deterministic float rendering for flag values
///
/// Integral values keep one trailing `.0` (`--clip-grad 1.0`);
/// fractional values use the shortest decimal form (`--lr 0.0001`).
pub(crate) fn format_float(value: f64) -> String {
    if value == value.trunc() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bertrun_config::LaunchConfig;

    #[test]
    fn test_format_float_integral_keeps_point_zero() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(2.0), "2.0");
    }

    #[test]
    fn test_format_float_fractional_minimal_digits() {
        assert_eq!(format_float(1.0e-4), "0.0001");
        assert_eq!(format_float(1.0e-5), "0.00001");
        assert_eq!(format_float(0.01), "0.01");
        assert_eq!(format_float(2.5), "2.5");
    }

    #[test]
    fn test_bare_flags_follow_value_flags() {
        let config = LaunchConfig::default();
        let args = bert_args(&config);

        // --fp16 and --bert-no-binary-head close the group, value-free
        assert_eq!(args[args.len() - 2], "--fp16");
        assert_eq!(args[args.len() - 1], "--bert-no-binary-head");
    }

    #[test]
    fn test_rendezvous_absent_for_single_process() {
        let config = LaunchConfig::default();
        assert!(rendezvous_args(&config.launch).is_empty());
    }

    #[test]
    fn test_rendezvous_present_for_multi_process() {
        let mut config = LaunchConfig::default();
        config.launch.nproc_per_node = 8;
        let args = rendezvous_args(&config.launch);

        assert_eq!(args[0], "--nproc_per_node");
        assert_eq!(args[1], "8");
        assert!(args.contains(&"--master_addr".to_string()));
        assert!(args.contains(&"--master_port".to_string()));
    }
}
