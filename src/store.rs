//! # Instrument Store
//!
//! Persists [`Instrument`] definitions keyed by name.
//!
//! The core only needs round-trip fidelity: an instrument saved under its name
//! loads back as an equal value. Two stores are provided:
//! - [`MemoryStore`] - A map held in memory, for tests and scratch work
//! - [`YamlStore`] - One YAML document holding the whole catalog on disk
//!
//! ## Configuration
//! The file location comes from a [`StoreConfig`] passed in at construction.
//! [`StoreConfig::from_env`] reads `STAFF_DB_PATH` once, falling back to
//! `staff.yaml` next to this crate's manifest.
//!
//! ## Example
//! ```rust,no_run
//! use staff::store::{InstrumentStore, StoreConfig, YamlStore};
//!
//! let mut store = YamlStore::open(StoreConfig::from_env())?;
//! for name in store.names() {
//!     println!("{}", store.load(&name)?);
//! }
//! # Ok::<(), staff::StaffError>(())
//! ```

use crate::error::{Result, StaffError};
use crate::instrument::Instrument;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the store location.
pub const STORE_PATH_ENV: &str = "STAFF_DB_PATH";

const DEFAULT_FILE_NAME: &str = "staff.yaml";

/// Where a [`YamlStore`] keeps its catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    path: PathBuf,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads [`STORE_PATH_ENV`]; unset or empty means the default location.
    pub fn from_env() -> Self {
        match std::env::var_os(STORE_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_FILE_NAME))
    }
}

/// Load/save contract for instrument catalogs.
pub trait InstrumentStore {
    /// Inserts or replaces the instrument stored under its name.
    fn save(&mut self, instrument: &Instrument) -> Result<()>;

    fn load(&self, name: &str) -> Result<Instrument>;

    /// Removes and returns the named instrument.
    fn remove(&mut self, name: &str) -> Result<Instrument>;

    /// Stored names in ascending order.
    fn names(&self) -> Vec<String>;
}

type Catalog = BTreeMap<String, Instrument>;

fn lookup(catalog: &Catalog, name: &str) -> Result<Instrument> {
    catalog
        .get(name)
        .cloned()
        .ok_or_else(|| StaffError::NotFound(format!("no stored instrument named '{}'", name)))
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    catalog: Catalog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstrumentStore for MemoryStore {
    fn save(&mut self, instrument: &Instrument) -> Result<()> {
        self.catalog
            .insert(instrument.name().to_string(), instrument.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Instrument> {
        lookup(&self.catalog, name)
    }

    fn remove(&mut self, name: &str) -> Result<Instrument> {
        self.catalog
            .remove(name)
            .ok_or_else(|| StaffError::NotFound(format!("no stored instrument named '{}'", name)))
    }

    fn names(&self) -> Vec<String> {
        self.catalog.keys().cloned().collect()
    }
}

/// Catalog stored as a YAML mapping from instrument name to definition.
///
/// Every change rewrites the whole file.
#[derive(Debug)]
pub struct YamlStore {
    config: StoreConfig,
    catalog: Catalog,
}

impl YamlStore {
    /// Loads the catalog at the configured path. A missing or empty file is
    /// an empty catalog. Every entry must be keyed by its instrument's name.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let catalog = if config.path().exists() {
            let text = fs::read_to_string(config.path())?;
            if text.trim().is_empty() {
                Catalog::new()
            } else {
                serde_yaml::from_str(&text)?
            }
        } else {
            Catalog::new()
        };
        if let Some((key, instrument)) = catalog.iter().find(|(k, i)| k.as_str() != i.name()) {
            return Err(StaffError::InvalidValue(format!(
                "{} stores instrument '{}' under the key '{}'",
                config.path().display(),
                instrument.name(),
                key
            )));
        }
        log::debug!(
            "opened instrument store at {} with {} instruments",
            config.path().display(),
            catalog.len()
        );
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.config.path().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(self.config.path(), serde_yaml::to_string(&self.catalog)?)?;
        log::debug!(
            "wrote {} instruments to {}",
            self.catalog.len(),
            self.config.path().display()
        );
        Ok(())
    }
}

impl InstrumentStore for YamlStore {
    fn save(&mut self, instrument: &Instrument) -> Result<()> {
        let previous = self
            .catalog
            .insert(instrument.name().to_string(), instrument.clone());
        if let Err(e) = self.persist() {
            // Keep memory in step with the file.
            match previous {
                Some(previous) => self.catalog.insert(previous.name().to_string(), previous),
                None => self.catalog.remove(instrument.name()),
            };
            return Err(e);
        }
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Instrument> {
        lookup(&self.catalog, name)
    }

    fn remove(&mut self, name: &str) -> Result<Instrument> {
        let removed = lookup(&self.catalog, name)?;
        self.catalog.remove(name);
        if let Err(e) = self.persist() {
            self.catalog.insert(name.to_string(), removed);
            return Err(e);
        }
        Ok(removed)
    }

    fn names(&self) -> Vec<String> {
        self.catalog.keys().cloned().collect()
    }
}
