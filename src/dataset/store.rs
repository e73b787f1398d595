//! Persistence of cleaned datasets under a table name.
//!
//! [`FileDatasetStore`] writes one JSON file per table into a directory;
//! [`MemoryDatasetStore`] keeps tables in a map, which is what tests use.
//! Saving under an existing name replaces the previous table.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;

use crate::dataset::Dataset;
use crate::error::{Result, TriageError};

/// A place cleaned datasets can be written to and read back from.
pub trait DatasetStore: Send + Sync + std::fmt::Debug {
    /// Save a dataset under `name`, replacing any existing table.
    fn save(&self, name: &str, dataset: &Dataset) -> Result<()>;

    /// Load the dataset stored under `name`.
    fn load(&self, name: &str) -> Result<Dataset>;

    /// Check whether a table exists.
    fn exists(&self, name: &str) -> bool;

    /// List the stored table names, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a table.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Reject names that are empty or would escape the store directory.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(TriageError::invalid_argument(format!(
            "Invalid table name '{name}'"
        )))
    }
}

/// A dataset store keeping one JSON file per table in a directory.
#[derive(Debug, Clone)]
pub struct FileDatasetStore {
    directory: PathBuf,
}

impl FileDatasetStore {
    const EXTENSION: &'static str = "json";

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

        Ok(FileDatasetStore { directory })
    }

    /// Get the root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.{}", Self::EXTENSION))
    }
}

impl DatasetStore for FileDatasetStore {
    fn save(&self, name: &str, dataset: &Dataset) -> Result<()> {
        validate_name(name)?;
        let path = self.table_path(name);

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, dataset)?;
        writer.flush()?;

        debug!("Saved {} messages to {}", dataset.len(), path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Dataset> {
        validate_name(name)?;
        let path = self.table_path(name);
        if !path.exists() {
            return Err(TriageError::storage(format!("Table not found: {name}")));
        }

        let reader = BufReader::new(File::open(&path)?);
        let dataset: Dataset = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.table_path(name).is_file()
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
        let path = self.table_path(name);
        if !path.exists() {
            return Err(TriageError::storage(format!("Table not found: {name}")));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

/// An in-memory dataset store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatasetStore {
    tables: Arc<RwLock<HashMap<String, Dataset>>>,
}

impl MemoryDatasetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tables.
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl DatasetStore for MemoryDatasetStore {
    fn save(&self, name: &str, dataset: &Dataset) -> Result<()> {
        validate_name(name)?;
        self.tables.write().insert(name.to_string(), dataset.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Dataset> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TriageError::storage(format!("Table not found: {name}")))
    }

    fn exists(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TriageError::storage(format!("Table not found: {name}")))
    }
}
