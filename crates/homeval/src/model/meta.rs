//! Model metadata.

use serde::{Deserialize, Serialize};

use crate::data::schema::{FEATURE_COLUMNS, FEATURE_COUNT};

/// Introspection data carried alongside a fitted model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature names, in weight order.
    pub feature_names: Vec<String>,
    /// Number of input features.
    pub n_features: usize,
    /// Rows in the cumulative dataset the model was fitted against.
    pub n_samples_trained: u64,
    /// How many training passes have produced this artifact lineage.
    pub n_updates: u32,
}

impl ModelMeta {
    /// Metadata for a freshly trained housing model.
    pub fn for_housing(n_samples_trained: u64) -> Self {
        Self {
            feature_names: FEATURE_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            n_features: FEATURE_COUNT,
            n_samples_trained,
            n_updates: 1,
        }
    }

    /// Successor metadata after another training pass.
    pub fn next_update(&self, n_samples_trained: u64) -> Self {
        Self {
            n_samples_trained,
            n_updates: self.n_updates + 1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn housing_meta_names_all_features() {
        let meta = ModelMeta::for_housing(100);
        assert_eq!(meta.feature_names.len(), FEATURE_COUNT);
        assert_eq!(meta.n_updates, 1);
        assert_eq!(meta.n_samples_trained, 100);
    }

    #[test]
    fn next_update_increments() {
        let meta = ModelMeta::for_housing(100);
        let next = meta.next_update(150);
        assert_eq!(next.n_updates, 2);
        assert_eq!(next.n_samples_trained, 150);
        assert_eq!(next.feature_names, meta.feature_names);
    }
}
