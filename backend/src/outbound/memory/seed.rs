//! Catalogue seed file loading.
//!
//! The seed is a single JSON document:
//!
//! ```json
//! { "categories": [ ... ], "products": [ ... ] }
//! ```
//!
//! Files are read through `cap_std` rather than `std::fs`.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use tracing::info;

use super::InMemoryModel;
use crate::domain::{Category, Product};

/// Errors raised while loading a catalogue seed.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read catalogue seed {path}: {source}")]
    Io {
        /// Seed path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The seed file is not a valid catalogue document.
    #[error("failed to parse catalogue seed {path}: {source}")]
    Parse {
        /// Seed path.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Documents loaded from a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueSeed {
    /// Category documents.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Product documents.
    #[serde(default)]
    pub products: Vec<Product>,
}

impl CatalogueSeed {
    /// Read and decode the seed at `path`.
    ///
    /// # Errors
    /// Returns [`SeedError::Io`] when the file cannot be read and
    /// [`SeedError::Parse`] when it is not a catalogue document.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let contents = read_file_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let seed: Self = serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            categories = seed.categories.len(),
            products = seed.products.len(),
            "loaded catalogue seed"
        );
        Ok(seed)
    }

    /// Split the seed into product and category models.
    #[must_use]
    pub fn into_models(self) -> (InMemoryModel<Product>, InMemoryModel<Category>) {
        (
            InMemoryModel::new(self.products),
            InMemoryModel::new(self.categories),
        )
    }
}

fn read_file_to_string(path: &Path) -> io::Result<String> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "seed path must include a file name",
        )
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read_to_string(Path::new(file_name))
}
