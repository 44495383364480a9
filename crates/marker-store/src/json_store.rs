use crate::diagnostic::{ClearScope, Diagnostic, MarkerTable};
use crate::errors::{MarkerStoreError, Result};
use crate::ledger::MarkerLedger;
use crate::store::MarkerStore;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of a markers file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerManifest {
    pub framework_version: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub markers: MarkerTable,
}

/// Marker store persisted as a pretty-printed JSON file.
///
/// The file is rewritten every time a change is published: after each write made
/// outside an operation, and once when the outermost operation ends.
#[derive(Debug)]
pub struct JsonMarkerStore {
    markers_path: PathBuf,
    framework_version: String,
    ledger: MarkerLedger,
}

impl JsonMarkerStore {
    /// Open the markers file at `markers_path`, creating it when missing
    pub fn new(markers_path: impl Into<PathBuf>, framework_version: String) -> Result<Self> {
        let markers_path = markers_path.into();
        let table = if markers_path.exists() {
            Self::load_table(&markers_path)?
        } else {
            if let Some(parent) = markers_path.parent() {
                fs::create_dir_all(parent).map_err(MarkerStoreError::Io)?;
            }
            MarkerTable::new()
        };

        let store = Self {
            markers_path,
            framework_version,
            ledger: MarkerLedger::new(table),
        };
        if !store.markers_path.exists() {
            store.save()?;
        }

        Ok(store)
    }

    fn load_table(markers_path: &Path) -> Result<MarkerTable> {
        debug!("Loading markers from: {}", markers_path.display());

        let content = fs::read_to_string(markers_path)?;
        let manifest: MarkerManifest = serde_json::from_str(&content)?;

        debug!(
            "Loaded {} diagnostics for {} files",
            manifest.markers.len(),
            manifest.markers.file_count()
        );
        Ok(manifest.markers)
    }

    fn save(&self) -> Result<()> {
        debug!("Saving markers to: {}", self.markers_path.display());

        let content = self.ledger.read(|table| {
            let manifest = MarkerManifest {
                framework_version: self.framework_version.clone(),
                updated_at: Utc::now(),
                markers: table.clone(),
            };
            serde_json::to_string_pretty(&manifest)
        })??;

        let temp_path = self.markers_path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.markers_path)?;

        debug!("Markers saved successfully");
        Ok(())
    }

    /// Re-read the markers file, dropping any published in-memory state.
    pub fn reload(&self) -> Result<()> {
        if !self.markers_path.exists() {
            warn!(
                "Markers file not found during reload: {}",
                self.markers_path.display()
            );
            return Ok(());
        }

        let table = Self::load_table(&self.markers_path)?;
        self.ledger.write(|current| *current = table)?;
        Ok(())
    }

    pub fn markers_path(&self) -> &Path {
        &self.markers_path
    }

    pub fn snapshot(&self) -> Result<MarkerTable> {
        self.ledger.read(MarkerTable::clone)
    }
}

impl MarkerStore for JsonMarkerStore {
    fn create_diagnostic(&self, diagnostic: Diagnostic) -> Result<()> {
        let (_, published) = self.ledger.write(|table| table.insert(diagnostic))?;
        if published {
            self.save()?;
        }
        Ok(())
    }

    fn clear_diagnostics(&self, path: &str, scope: ClearScope) -> Result<usize> {
        let (removed, published) = self.ledger.write(|table| table.clear(path, scope))?;
        if published && removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    fn diagnostics(&self, path: &str) -> Result<Vec<Diagnostic>> {
        self.ledger.read(|table| table.diagnostics(path))
    }

    fn all_diagnostics(&self) -> Result<Vec<Diagnostic>> {
        self.ledger.read(|table| table.iter().cloned().collect())
    }

    fn begin_operation(&self) -> Result<()> {
        self.ledger.begin()
    }

    fn end_operation(&self) -> Result<()> {
        if self.ledger.end()? {
            self.save()?;
        }
        Ok(())
    }
}
