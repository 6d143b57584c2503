//! Resolved-parameter table printed before launch

use crate::plan::format_float;
use bertrun_config::LaunchConfig;

const BORDER: &str =
    "+-----------------------+----------------------------------------------------+";

/// Render the resolved launch parameters as a boxed table
///
/// One row per knob the trainer receives, in command-line order, plus
/// the derived world size.
pub fn render_summary(config: &LaunchConfig) -> String {
    let precision = if config.optimizer.fp16 { "fp16" } else { "fp32" };
    let binary_head = if config.model.binary_head {
        "enabled"
    } else {
        "disabled"
    };

    let rows: Vec<(&str, String)> = vec![
        ("launcher", config.launch.launcher.clone()),
        ("script", config.launch.script.clone()),
        ("data path", config.data.data_path.clone()),
        ("vocab file", config.data.vocab_file.clone()),
        ("data impl", config.data.data_impl.to_string()),
        ("split", config.data.split.clone()),
        ("save path", config.output.save.clone()),
        ("load path", config.output.load_path().to_string()),
        ("num layers", config.model.num_layers.to_string()),
        ("hidden size", config.model.hidden_size.to_string()),
        ("attention heads", config.model.num_attention_heads.to_string()),
        ("seq length", config.model.seq_length.to_string()),
        ("max position emb", config.model.max_position_embeddings.to_string()),
        ("binary head", binary_head.to_string()),
        ("micro batch size", config.training.micro_batch_size.to_string()),
        ("global batch size", config.training.global_batch_size.to_string()),
        ("train iters", config.training.train_iters.to_string()),
        ("learning rate", format_float(config.optimizer.lr)),
        ("lr decay style", config.optimizer.lr_decay_style.to_string()),
        ("lr decay iters", config.optimizer.lr_decay_iters.to_string()),
        ("min lr", format_float(config.optimizer.min_lr)),
        ("weight decay", format_float(config.optimizer.weight_decay)),
        ("lr warmup fraction", format_float(config.optimizer.lr_warmup_fraction)),
        ("clip grad", format_float(config.optimizer.clip_grad)),
        ("precision", precision.to_string()),
        ("log interval", config.output.log_interval.to_string()),
        ("save interval", config.output.save_interval.to_string()),
        ("eval interval", config.output.eval_interval.to_string()),
        ("eval iters", config.output.eval_iters.to_string()),
        ("world size", config.launch.world_size().to_string()),
    ];

    let mut out = String::new();
    out.push_str(BORDER);
    out.push('\n');
    out.push_str(&format!("| {:<21} | {:<50} |\n", "Parameter", "Value"));
    out.push_str(BORDER);
    out.push('\n');
    for (name, value) in rows {
        out.push_str(&format!("| {:<21} | {:<50} |\n", name, value));
    }
    out.push_str(BORDER);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_resolved_values() {
        let mut config = LaunchConfig::default();
        config.data.data_path = "/data/bert_text_sentence".to_string();
        config.output.save = "/checkpoints/bert".to_string();

        let summary = render_summary(&config);

        assert!(summary.contains("| num layers"));
        assert!(summary.contains("| 24"));
        assert!(summary.contains("/data/bert_text_sentence"));
        assert!(summary.contains("| 0.0001"));
        assert!(summary.contains("| fp16"));
        // load falls back to save
        assert_eq!(summary.matches("/checkpoints/bert").count(), 2);
    }

    #[test]
    fn test_summary_is_boxed() {
        let summary = render_summary(&LaunchConfig::default());
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.first(), Some(&BORDER));
        assert_eq!(lines.last(), Some(&BORDER));
        for line in &lines {
            assert_eq!(line.len(), BORDER.len());
        }
    }
}
