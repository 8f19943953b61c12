//! Artifact persistence.
//!
//! All artifacts live in one state directory and are written with a
//! write-to-temp-then-atomic-rename discipline, so a reader can never
//! observe a half-written file. Absence of an artifact means "no prior
//! state", not an error; a present-but-undecodable artifact is a hard
//! error.

mod payload;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::data::RowStore;
use crate::model::{LinearModel, ModelMeta, StandardScaler};

pub use payload::{
    FileRows, ModelPayload, ModelPayloadV1, RowsPayload, RowsPayloadV1, ScalerPayload,
    ScalerPayloadV1,
};

/// Errors raised while saving or loading artifacts.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: postcard::Error,
    },

    #[error("failed to encode artifact: {0}")]
    Encode(#[source] postcard::Error),
}

/// Fixed member file names within the state directory.
const MODEL_FILE: &str = "model.hv";
const SCALER_FILE: &str = "scaler.hv";
const ROWS_FILE: &str = "rows.hv";
const LEDGER_FILE: &str = "ledger.txt";

/// Artifact storage rooted at a state directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| PersistError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn model_path(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.root.join(SCALER_FILE)
    }

    pub fn rows_path(&self) -> PathBuf {
        self.root.join(ROWS_FILE)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    // ========================================================================
    // Model / scaler pair
    // ========================================================================

    /// Save the model artifact.
    pub fn save_model(&self, model: &LinearModel, meta: &ModelMeta) -> Result<(), PersistError> {
        self.save_payload(&self.model_path(), &ModelPayload::from_model(model, meta))
    }

    /// Save the scaler artifact.
    pub fn save_scaler(&self, scaler: &StandardScaler) -> Result<(), PersistError> {
        self.save_payload(&self.scaler_path(), &ScalerPayload::from_scaler(scaler))
    }

    /// Load the model/scaler pair.
    ///
    /// Returns `None` when either artifact is missing: a half-pair is
    /// treated as "no prior model" rather than an inconsistency the caller
    /// must untangle.
    pub fn load_pair(
        &self,
    ) -> Result<Option<(LinearModel, ModelMeta, StandardScaler)>, PersistError> {
        let model: Option<ModelPayload> = self.load_payload(&self.model_path())?;
        let scaler: Option<ScalerPayload> = self.load_payload(&self.scaler_path())?;
        match (model, scaler) {
            (Some(model), Some(scaler)) => {
                let (model, meta) = model.into_model();
                Ok(Some((model, meta, scaler.into_scaler())))
            }
            _ => Ok(None),
        }
    }

    /// Modification time of the model artifact, if present.
    ///
    /// Serving uses this as a cheap change signal for reload-on-change.
    pub fn model_mtime(&self) -> Option<SystemTime> {
        fs::metadata(self.model_path())
            .and_then(|m| m.modified())
            .ok()
    }

    // ========================================================================
    // Cumulative rows
    // ========================================================================

    /// Save the cumulative row store.
    pub fn save_rows(&self, store: &RowStore) -> Result<(), PersistError> {
        self.save_payload(&self.rows_path(), &RowsPayload::from_store(store))
    }

    /// Load the cumulative row store; missing file means empty.
    pub fn load_rows(&self) -> Result<RowStore, PersistError> {
        let payload: Option<RowsPayload> = self.load_payload(&self.rows_path())?;
        Ok(payload.map(RowsPayload::into_store).unwrap_or_default())
    }

    // ========================================================================
    // Encoding helpers
    // ========================================================================

    fn save_payload<T: Serialize>(&self, path: &Path, payload: &T) -> Result<(), PersistError> {
        let bytes = postcard::to_allocvec(payload).map_err(PersistError::Encode)?;
        write_atomic(path, &bytes).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_payload<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, PersistError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let payload = postcard::from_bytes(&bytes).map_err(|source| PersistError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(payload))
    }
}

/// Write `bytes` to `path` via a temp file in the same directory plus an
/// atomic rename. Readers observe either the old file or the new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
