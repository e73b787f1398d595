//! Persistence of fitted pipelines.
//!
//! Pipelines are written as bincode blobs. [`FileModelStore`] keeps one
//! `.bin` file per model name in a directory; [`MemoryModelStore`] keeps the
//! encoded bytes in a map, so both exercise the same encoding.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use parking_lot::RwLock;

use crate::dataset::store::validate_name;
use crate::error::{Result, TriageError};
use crate::model::pipeline::FittedPipeline;

/// A place fitted pipelines can be written to and read back from.
pub trait ModelStore: Send + Sync + std::fmt::Debug {
    /// Save a pipeline under `name`, replacing any existing model.
    fn save(&self, name: &str, pipeline: &FittedPipeline) -> Result<()>;

    /// Load the pipeline stored under `name`.
    fn load(&self, name: &str) -> Result<FittedPipeline>;

    /// Check whether a model exists.
    fn exists(&self, name: &str) -> bool;

    /// List the stored model names, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a model.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Encode a pipeline to bytes.
pub fn encode(pipeline: &FittedPipeline) -> Result<Vec<u8>> {
    Ok(bincode::serialize(pipeline)?)
}

/// Decode a pipeline from bytes written by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<FittedPipeline> {
    Ok(bincode::deserialize(bytes)?)
}

/// A model store keeping one bincode file per model in a directory.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    directory: PathBuf,
}

impl FileModelStore {
    const EXTENSION: &'static str = "bin";

    /// Open a store rooted at `directory`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory)
                .map_err(|e| TriageError::storage(format!("Failed to create directory: {e}")))?;
        }
        if !directory.is_dir() {
            return Err(TriageError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileModelStore { directory })
    }

    /// Get the root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn model_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.{}", Self::EXTENSION))
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, name: &str, pipeline: &FittedPipeline) -> Result<()> {
        validate_name(name)?;
        let path = self.model_path(name);

        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, pipeline)?;
        writer.flush()?;

        info!("Saved model to {}", path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<FittedPipeline> {
        validate_name(name)?;
        let path = self.model_path(name);
        if !path.exists() {
            return Err(TriageError::storage(format!("Model not found: {name}")));
        }

        let reader = BufReader::new(File::open(&path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.model_path(name).is_file()
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(Self::EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let path = self.model_path(name);
        if !path.exists() {
            return Err(TriageError::storage(format!("Model not found: {name}")));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

/// An in-memory model store holding encoded pipelines.
#[derive(Debug, Clone, Default)]
pub struct MemoryModelStore {
    models: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryModelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total encoded size of all stored models.
    pub fn total_size(&self) -> usize {
        self.models.read().values().map(Vec::len).sum()
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, name: &str, pipeline: &FittedPipeline) -> Result<()> {
        validate_name(name)?;
        let bytes = encode(pipeline)?;
        self.models.write().insert(name.to_string(), bytes);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<FittedPipeline> {
        let models = self.models.read();
        let bytes = models
            .get(name)
            .ok_or_else(|| TriageError::storage(format!("Model not found: {name}")))?;
        decode(bytes)
    }

    fn exists(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.models
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TriageError::storage(format!("Model not found: {name}")))
    }
}
