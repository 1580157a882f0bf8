//! Persistent registry of loaded datasets and fitted models
//!
//! The registry is an owned store handed to every tool invocation. Its full
//! contents are written to a single JSON state file after each mutation, and
//! every trained model additionally gets its own file under the model directory.

mod state;

pub use state::STATE_VERSION;

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{Dataset, LinearModel};
use state::{ModelFile, StateFile, StateSnapshot};

/// Errors raised while persisting or restoring registry state
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported state version {found} in {path} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u64,
        expected: u32,
    },

    #[error("Failed to encode registry state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the registry keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryPaths {
    pub state_file: PathBuf,
    pub model_dir: PathBuf,
}

impl RegistryPaths {
    pub fn new(state_file: impl Into<PathBuf>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
            model_dir: model_dir.into(),
        }
    }

    /// Both files under a single directory, with the default names
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("server_state.json"), dir.join("saved_models"))
    }
}

#[derive(Debug)]
pub struct Registry {
    datasets: IndexMap<String, Dataset>,
    models: IndexMap<String, LinearModel>,
    paths: RegistryPaths,
}

impl Registry {
    /// Creates an empty registry without touching the filesystem
    pub fn empty(paths: RegistryPaths) -> Self {
        Self {
            datasets: IndexMap::new(),
            models: IndexMap::new(),
            paths,
        }
    }

    /// Creates the model directory and restores any previously saved state.
    ///
    /// A missing state file yields an empty registry; a corrupt one is an error.
    pub fn open(paths: RegistryPaths) -> Result<Self, RegistryError> {
        fs::create_dir_all(&paths.model_dir).map_err(|source| RegistryError::Write {
            path: paths.model_dir.clone(),
            source,
        })?;

        let mut registry = Self::empty(paths);
        registry.load()?;
        Ok(registry)
    }

    /// Merges the state file into memory; entries from the file replace same-named ones
    pub fn load(&mut self) -> Result<(), RegistryError> {
        let path = &self.paths.state_file;
        if !path.exists() {
            debug!(path = %path.display(), "No state file, starting with an empty registry");
            return Ok(());
        }

        let bytes = fs::read(path).map_err(|source| RegistryError::Read {
            path: path.clone(),
            source,
        })?;
        let state: StateFile = state::decode(path, &bytes)?;

        let (datasets, models) = (state.datasets.len(), state.models.len());
        self.datasets.extend(state.datasets);
        self.models.extend(state.models);

        info!(
            path = %path.display(),
            datasets,
            models,
            "Restored registry state"
        );
        Ok(())
    }

    /// Overwrites the state file with every dataset and model currently held
    pub fn save(&self) -> Result<(), RegistryError> {
        let snapshot = StateSnapshot {
            version: STATE_VERSION,
            datasets: &self.datasets,
            models: &self.models,
        };
        let encoded = serde_json::to_vec(&snapshot)?;

        let path = &self.paths.state_file;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RegistryError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, encoded).map_err(|source| RegistryError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(
            path = %path.display(),
            datasets = self.datasets.len(),
            models = self.models.len(),
            "Saved registry state"
        );
        Ok(())
    }

    /// Inserts or replaces a dataset, returning the previous value under that key
    pub fn insert_dataset(&mut self, key: impl Into<String>, dataset: Dataset) -> Option<Dataset> {
        self.datasets.insert(key.into(), dataset)
    }

    pub fn dataset(&self, key: &str) -> Option<&Dataset> {
        self.datasets.get(key)
    }

    pub fn dataset_keys(&self) -> Vec<String> {
        self.datasets.keys().cloned().collect()
    }

    pub fn insert_model(&mut self, name: impl Into<String>, model: LinearModel) -> Option<LinearModel> {
        self.models.insert(name.into(), model)
    }

    /// In-memory lookup only
    pub fn model(&self, name: &str) -> Option<&LinearModel> {
        self.models.get(name)
    }

    /// Looks a model up in memory, falling back to its per-model file.
    ///
    /// A model found on disk is cached in memory but the state file is not rewritten.
    pub fn resolve_model(&mut self, name: &str) -> Result<Option<&LinearModel>, RegistryError> {
        if !self.models.contains_key(name) {
            match self.load_model_file(name)? {
                Some(model) => {
                    debug!(model = name, "Loaded model from its model file");
                    self.models.insert(name.to_string(), model);
                }
                None => return Ok(None),
            }
        }
        Ok(self.models.get(name))
    }

    pub fn model_keys(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn model_file_path(&self, name: &str) -> PathBuf {
        let safe_name = name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.paths.model_dir.join(format!("{}.json", safe_name))
    }

    /// Writes the per-model file for a model held in memory
    pub fn save_model(&self, name: &str) -> Result<Option<PathBuf>, RegistryError> {
        let Some(model) = self.models.get(name) else {
            return Ok(None);
        };

        fs::create_dir_all(&self.paths.model_dir).map_err(|source| RegistryError::Write {
            path: self.paths.model_dir.clone(),
            source,
        })?;

        let path = self.model_file_path(name);
        let encoded = serde_json::to_vec_pretty(&ModelFile {
            version: STATE_VERSION,
            model: model.clone(),
        })?;
        fs::write(&path, encoded).map_err(|source| RegistryError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(model = name, path = %path.display(), "Saved model file");
        Ok(Some(path))
    }

    /// Inserts a dataset and rewrites the state file.
    ///
    /// If the write fails the in-memory entry is restored to what it was before.
    /// Returns whether an existing dataset was replaced.
    pub fn store_dataset(&mut self, key: &str, dataset: Dataset) -> Result<bool, RegistryError> {
        let previous = self.datasets.insert(key.to_string(), dataset);

        if let Err(e) = self.save() {
            match previous {
                Some(old) => {
                    self.datasets.insert(key.to_string(), old);
                }
                None => {
                    self.datasets.shift_remove(key);
                }
            }
            return Err(e);
        }
        Ok(previous.is_some())
    }

    /// Inserts a model, writes its model file and rewrites the state file.
    ///
    /// On failure memory and the model file are rolled back to the previous model, or
    /// removed when there was none. Returns whether an existing model was replaced.
    pub fn store_model(&mut self, name: &str, model: LinearModel) -> Result<bool, RegistryError> {
        let previous = self.models.insert(name.to_string(), model);

        let persisted = self.save_model(name).and_then(|_| self.save());
        if let Err(e) = persisted {
            let replaced = previous.is_some();
            match previous {
                Some(old) => {
                    self.models.insert(name.to_string(), old);
                }
                None => {
                    self.models.shift_remove(name);
                }
            }
            self.restore_model_file(name, replaced);
            return Err(e);
        }
        Ok(previous.is_some())
    }

    fn restore_model_file(&self, name: &str, had_previous: bool) {
        let restored = if had_previous {
            self.save_model(name).map(|_| ())
        } else {
            let path = self.model_file_path(name);
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(RegistryError::Write { path, source }),
            }
        };

        if let Err(e) = restored {
            warn!(model = name, error = %e, "Failed to roll back model file");
        }
    }

    pub fn load_model_file(&self, name: &str) -> Result<Option<LinearModel>, RegistryError> {
        let path = self.model_file_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|source| RegistryError::Read {
            path: path.clone(),
            source,
        })?;
        let file: ModelFile = state::decode(&path, &bytes)?;
        Ok(Some(file.model))
    }

    pub fn paths(&self) -> &RegistryPaths {
        &self.paths
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
