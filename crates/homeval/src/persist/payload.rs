//! Payload structures for the artifact storage format.
//!
//! These structs are designed for serialization with postcard. Each artifact
//! kind carries a version-tagged enum so new format versions add variants
//! rather than changing existing ones; older readers detect unsupported
//! versions by the enum discriminant.

use serde::{Deserialize, Serialize};

use crate::data::{HousingRecord, RowStore};
use crate::model::{LinearModel, ModelMeta, StandardScaler};

// ============================================================================
// Model
// ============================================================================

/// Version-tagged model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelPayload {
    V1(ModelPayloadV1),
}

/// Version 1 model payload: weights, intercept, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPayloadV1 {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub meta: ModelMeta,
}

impl ModelPayload {
    pub fn from_model(model: &LinearModel, meta: &ModelMeta) -> Self {
        Self::V1(ModelPayloadV1 {
            weights: model.weights().to_vec(),
            intercept: model.intercept(),
            meta: meta.clone(),
        })
    }

    pub fn into_model(self) -> (LinearModel, ModelMeta) {
        match self {
            Self::V1(v1) => (
                LinearModel::from_parameters(v1.weights, v1.intercept),
                v1.meta,
            ),
        }
    }
}

// ============================================================================
// Scaler
// ============================================================================

/// Version-tagged scaler artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalerPayload {
    V1(ScalerPayloadV1),
}

/// Version 1 scaler payload: fitted per-feature means and scales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerPayloadV1 {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl ScalerPayload {
    pub fn from_scaler(scaler: &StandardScaler) -> Self {
        Self::V1(ScalerPayloadV1 {
            means: scaler.means().to_vec(),
            scales: scaler.scales().to_vec(),
        })
    }

    pub fn into_scaler(self) -> StandardScaler {
        match self {
            Self::V1(v1) => StandardScaler::from_parameters(v1.means, v1.scales),
        }
    }
}

// ============================================================================
// Cumulative rows
// ============================================================================

/// Version-tagged cumulative-row artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowsPayload {
    V1(RowsPayloadV1),
}

/// Version 1 row payload: per-file row groups in filename order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowsPayloadV1 {
    pub files: Vec<FileRows>,
}

/// Rows contributed by one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRows {
    pub name: String,
    pub rows: Vec<HousingRecord>,
}

impl RowsPayload {
    pub fn from_store(store: &RowStore) -> Self {
        Self::V1(RowsPayloadV1 {
            files: store
                .iter()
                .map(|(name, rows)| FileRows {
                    name: name.to_string(),
                    rows: rows.to_vec(),
                })
                .collect(),
        })
    }

    pub fn into_store(self) -> RowStore {
        match self {
            Self::V1(v1) => {
                let mut store = RowStore::new();
                for file in v1.files {
                    store.insert_file(file.name, file.rows);
                }
                store
            }
        }
    }
}
