//! Named model architecture presets

use crate::sections::ModelArgs;

/// Published BERT architectures applied over [`ModelArgs`]
///
/// A preset overwrites the layer count, hidden size, and attention head
/// count; sequence settings and the binary head flag are left for the
/// caller to adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPreset {
    /// 12 layers, 768 hidden, 12 heads (~110M parameters)
    BertBase,
    /// 24 layers, 1024 hidden, 16 heads (~340M parameters)
    BertLarge,
}

impl ModelPreset {
    /// Architecture triple: (layers, hidden size, attention heads)
    pub fn dimensions(&self) -> (usize, usize, usize) {
        match self {
            ModelPreset::BertBase => (12, 768, 12),
            ModelPreset::BertLarge => (24, 1024, 16),
        }
    }

    /// Overwrite the architecture fields of `model`
    pub fn apply(&self, model: &mut ModelArgs) {
        let (num_layers, hidden_size, num_attention_heads) = self.dimensions();
        model.num_layers = num_layers;
        model.hidden_size = hidden_size;
        model.num_attention_heads = num_attention_heads;
    }
}
