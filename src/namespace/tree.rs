//! Ordered name -> entry tree handed to the filesystem mounter

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::validate_entry_name;

/// A leaf holding text, or a nested directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    File(String),
    Dir(Namespace),
}

/// One directory level; serializes as a JSON object in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace {
    entries: IndexMap<String, Entry>,
}

/// Counts reported after writing a namespace to disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    pub dirs_created: usize,
    pub files_written: usize,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_file(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(name.into(), Entry::File(content.into()));
    }

    pub fn insert_dir(&mut self, name: impl Into<String>, dir: Namespace) {
        self.entries.insert(name.into(), Entry::Dir(dir));
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn file(&self, name: &str) -> Option<&str> {
        match self.entries.get(name)? {
            Entry::File(content) => Some(content),
            Entry::Dir(_) => None,
        }
    }

    pub fn dir(&self, name: &str) -> Option<&Namespace> {
        match self.entries.get(name)? {
            Entry::Dir(dir) => Some(dir),
            Entry::File(_) => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialized namespace document: directories are objects, files are strings
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization itself fails.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize namespace")
    }

    /// Write the tree under `root`, creating `root` if needed
    ///
    /// Existing files with the same names are overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `root` exists and is not a directory
    /// - An entry name is not a single normal path component
    /// - Any directory or file cannot be created
    pub fn materialize(&self, root: &Path) -> Result<MaterializeStats> {
        if root.exists() && !root.is_dir() {
            bail!("Output path is not a directory: {}", root.display());
        }
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create output directory: {}", root.display()))?;

        let mut stats = MaterializeStats::default();
        self.write_into(root, &mut stats)?;
        debug!(
            dirs = stats.dirs_created,
            files = stats.files_written,
            "Materialized namespace into {}",
            root.display()
        );
        Ok(stats)
    }

    fn write_into(&self, dir: &Path, stats: &mut MaterializeStats) -> Result<()> {
        for (name, entry) in &self.entries {
            validate_entry_name(name)
                .with_context(|| format!("Refusing to write entry under {}", dir.display()))?;
            let path = dir.join(name);

            match entry {
                Entry::File(content) => {
                    fs::write(&path, content)
                        .with_context(|| format!("Failed to write file: {}", path.display()))?;
                    stats.files_written += 1;
                }
                Entry::Dir(child) => {
                    fs::create_dir_all(&path).with_context(|| {
                        format!("Failed to create directory: {}", path.display())
                    })?;
                    stats.dirs_created += 1;
                    child.write_into(&path, stats)?;
                }
            }
        }
        Ok(())
    }
}
