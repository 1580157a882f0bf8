//! On-disk schema for registry state
//!
//! ```json
//! {"version": 1, "datasets": {"<key>": {"columns": [...]}}, "models": {"<name>": {...}}}
//! ```

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::RegistryError;
use crate::data::{Dataset, LinearModel};

/// Schema version written to state and model files
pub const STATE_VERSION: u32 = 1;

#[derive(Serialize)]
pub(super) struct StateSnapshot<'a> {
    pub version: u32,
    pub datasets: &'a IndexMap<String, Dataset>,
    pub models: &'a IndexMap<String, LinearModel>,
}

#[derive(Deserialize)]
pub(super) struct StateFile {
    #[serde(default)]
    pub datasets: IndexMap<String, Dataset>,
    #[serde(default)]
    pub models: IndexMap<String, LinearModel>,
}

#[derive(Serialize, Deserialize)]
pub(super) struct ModelFile {
    pub version: u32,
    pub model: LinearModel,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u64,
}

/// Checks the version header before decoding the full document
pub(super) fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, RegistryError> {
    let corrupt = |source| RegistryError::Corrupt {
        path: path.to_path_buf(),
        source,
    };

    let header: VersionHeader = serde_json::from_slice(bytes).map_err(corrupt)?;
    if header.version != u64::from(STATE_VERSION) {
        return Err(RegistryError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: header.version,
            expected: STATE_VERSION,
        });
    }

    serde_json::from_slice(bytes).map_err(corrupt)
}
