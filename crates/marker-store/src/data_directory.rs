//! Data directory management for the marker-store crate
//!
//! Persisted diagnostics and background logs live in one data directory, with one
//! sub-directory per linted project named after a hash of its canonical path:
//!
//! ```text
//! .jslint-builder/
//! ├── projects/
//! │   ├── project_1_hash/
//! │   │   ├── markers.json
//! │   ├── project_2_hash/
//! │   │   ├── markers.json
//! ├── logs/
//! ```

use crate::errors::{MarkerStoreError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = ".jslint-builder";
const PROJECTS_DIR_NAME: &str = "projects";
const LOGS_DIR_NAME: &str = "logs";
const MARKERS_FILE_NAME: &str = "markers.json";

/// Manages the data directory shared by every linted project
#[derive(Debug, Clone)]
pub struct DataDirectory {
    pub root_path: PathBuf,
    pub projects_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl DataDirectory {
    pub fn new_system_default() -> Result<Self> {
        let root_path = Self::get_system_data_directory()?;
        Self::new(root_path)
    }

    pub fn new(root_path: PathBuf) -> Result<Self> {
        let projects_dir = root_path.join(PROJECTS_DIR_NAME);
        let logs_dir = root_path.join(LOGS_DIR_NAME);
        let data_dir = Self {
            root_path,
            projects_dir,
            logs_dir,
        };
        data_dir.ensure_directory_structure()?;
        Ok(data_dir)
    }

    pub fn get_system_data_directory() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(DATA_DIR_NAME))
            .ok_or(MarkerStoreError::SystemDataDirectoryNotFound)
    }

    pub fn project_directory(&self, project_path: &Path) -> PathBuf {
        self.projects_dir.join(project_hash(project_path))
    }

    pub fn project_markers_path(&self, project_path: &Path) -> PathBuf {
        self.project_directory(project_path).join(MARKERS_FILE_NAME)
    }

    pub fn ensure_directory_structure(&self) -> Result<()> {
        for dir in [&self.root_path, &self.projects_dir, &self.logs_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|_| {
                    MarkerStoreError::DataDirectoryCreationFailed { path: dir.clone() }
                })?;
                log::debug!("Created data directory: {}", dir.display());
            }
        }
        Ok(())
    }

    pub fn ensure_project_directory(&self, project_path: &Path) -> Result<PathBuf> {
        let project_dir = self.project_directory(project_path);
        if !project_dir.exists() {
            std::fs::create_dir_all(&project_dir).map_err(|_| {
                MarkerStoreError::DataDirectoryCreationFailed {
                    path: project_dir.clone(),
                }
            })?;
            log::debug!("Created project directory: {}", project_dir.display());
        }
        Ok(project_dir)
    }

    pub fn remove_project_directory(&self, project_path: &Path) -> Result<()> {
        let project_dir = self.project_directory(project_path);

        if project_dir.exists() {
            std::fs::remove_dir_all(&project_dir)?;
            log::info!("Removed project directory: {}", project_dir.display());
        }

        Ok(())
    }
}

/// Stable short identifier for a project path
pub fn project_hash(project_path: &Path) -> String {
    let canonical_path =
        dunce::canonicalize(project_path).unwrap_or_else(|_| project_path.to_path_buf());

    let mut hasher = Sha256::new();
    hasher.update(canonical_path.to_string_lossy().as_bytes());
    let hash_bytes = hasher.finalize();

    hex::encode(&hash_bytes[..8])
}
