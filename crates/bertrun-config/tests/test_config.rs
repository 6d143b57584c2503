//! Integration tests for configuration loading and presets

use bertrun_config::{DataImpl, DecayStyle, LaunchConfig, ModelPreset};
use std::fs;
use tempfile::TempDir;

/// Defaults with the three required paths filled in
fn launchable_config() -> LaunchConfig {
    let mut config = LaunchConfig::default();
    config.data.data_path = "/data/bert_text_sentence".to_string();
    config.data.vocab_file = "/data/bert-vocab.txt".to_string();
    config.output.save = "/checkpoints/bert".to_string();
    config
}

#[test]
fn test_defaults_match_single_node_bert_large_launch() {
    let config = LaunchConfig::default();

    assert_eq!(config.model.num_layers, 24);
    assert_eq!(config.model.hidden_size, 1024);
    assert_eq!(config.model.num_attention_heads, 16);
    assert_eq!(config.model.seq_length, 512);
    assert_eq!(config.model.max_position_embeddings, 512);
    assert!(!config.model.binary_head);

    assert_eq!(config.training.micro_batch_size, 4);
    assert_eq!(config.training.global_batch_size, 8);
    assert_eq!(config.training.train_iters, 2_000_000);

    assert_eq!(config.optimizer.lr, 1.0e-4);
    assert_eq!(config.optimizer.lr_decay_iters, 990_000);
    assert_eq!(config.optimizer.lr_decay_style, DecayStyle::Linear);
    assert_eq!(config.optimizer.min_lr, 1.0e-5);
    assert_eq!(config.optimizer.weight_decay, 1.0e-2);
    assert_eq!(config.optimizer.lr_warmup_fraction, 0.01);
    assert_eq!(config.optimizer.clip_grad, 1.0);
    assert!(config.optimizer.fp16);

    assert_eq!(config.data.data_impl, DataImpl::Mmap);
    assert_eq!(config.data.split, "949,50,1");

    assert_eq!(config.output.log_interval, 100);
    assert_eq!(config.output.save_interval, 10_000);
    assert_eq!(config.output.eval_interval, 1_000);
    assert_eq!(config.output.eval_iters, 10);

    assert_eq!(config.launch.launcher, "torchrun");
    assert_eq!(config.launch.script, "pretrain_bert.py");
    assert_eq!(config.launch.world_size(), 1);
}

#[test]
fn test_launchable_config_validates() {
    launchable_config().validate().expect("Config should validate");
}

#[test]
fn test_from_file_round_trip() {
    let config = launchable_config();
    let json = serde_json::to_string_pretty(&config).expect("Failed to serialize config");

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("launch.json");
    fs::write(&path, json).expect("Failed to write config file");

    let reloaded = LaunchConfig::from_file(&path).expect("Failed to reload config");
    assert_eq!(reloaded, config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("launch.json");
    fs::write(
        &path,
        r#"{"optimizer": {"lr_decay_style": "cosine"}, "launch": {"nproc_per_node": 8}}"#,
    )
    .expect("Failed to write config file");

    let config = LaunchConfig::from_file(&path).expect("Failed to load config");

    assert_eq!(config.optimizer.lr_decay_style, DecayStyle::Cosine);
    assert_eq!(config.optimizer.lr, 1.0e-4);
    assert_eq!(config.launch.nproc_per_node, 8);
    assert_eq!(config.launch.nnodes, 1);
    assert_eq!(config.model, LaunchConfig::default().model);
}

#[test]
fn test_empty_file_is_all_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("launch.json");
    fs::write(&path, "{}").expect("Failed to write config file");

    let config = LaunchConfig::from_file(&path).expect("Failed to load config");
    assert_eq!(config, LaunchConfig::default());
}

#[test]
fn test_extra_env_round_trips() {
    let mut config = launchable_config();
    config
        .launch
        .env
        .insert("NCCL_DEBUG".to_string(), "INFO".to_string());
    config
        .launch
        .env
        .insert("OMP_NUM_THREADS".to_string(), "4".to_string());

    let json = serde_json::to_string(&config).expect("Failed to serialize config");
    let reloaded: LaunchConfig = serde_json::from_str(&json).expect("Failed to parse config");

    assert_eq!(reloaded.launch.env.get("NCCL_DEBUG").map(String::as_str), Some("INFO"));
    assert_eq!(reloaded, config);
}

#[test]
fn test_preset_then_validate() {
    let mut config = launchable_config();
    ModelPreset::BertBase.apply(&mut config.model);

    assert_eq!(config.model.num_layers, 12);
    assert_eq!(config.model.hidden_size, 768);
    assert_eq!(config.model.num_attention_heads, 12);
    config.validate().expect("Preset config should validate");
}

#[test]
fn test_load_defaults_to_save() {
    let config = launchable_config();
    assert_eq!(config.output.load, None);
    assert_eq!(config.output.load_path(), "/checkpoints/bert");
}

#[test]
fn test_explicit_load_survives_round_trip() {
    let mut config = launchable_config();
    config.output.load = Some("/checkpoints/warm-start".to_string());

    let json = serde_json::to_string(&config).expect("Failed to serialize config");
    let reloaded: LaunchConfig = serde_json::from_str(&json).expect("Failed to parse config");

    assert_eq!(reloaded.output.load_path(), "/checkpoints/warm-start");
    assert_eq!(reloaded.output.save, "/checkpoints/bert");
}
