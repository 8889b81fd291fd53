//! Vehicle folder layout
//!
//! ```text
//! <root>/<manufacturer>/<date>/<vehicle>/
//!     <vehicle>.xlsx
//!     תמונות/
//!     <vehicle> - חוסרים.pdf
//!     <vehicle> - חוסרים.png
//! ```

use inspect_common::report::REPORT_TITLE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PHOTOS_DIR: &str = "תמונות";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleId {
    pub manufacturer: String,
    pub date_folder: String,
    pub vehicle: String,
}

impl VehicleId {
    pub fn new(manufacturer: impl Into<String>, date_folder: impl Into<String>, vehicle: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            date_folder: date_folder.into(),
            vehicle: vehicle.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn vehicle_dir(&self, id: &VehicleId) -> PathBuf {
        self.root.join(&id.manufacturer).join(&id.date_folder).join(&id.vehicle)
    }

    pub fn workbook_path(&self, id: &VehicleId) -> PathBuf {
        self.vehicle_dir(id).join(format!("{}.xlsx", id.vehicle))
    }

    pub fn photos_dir(&self, id: &VehicleId) -> PathBuf {
        self.vehicle_dir(id).join(PHOTOS_DIR)
    }
}

/// Workbook, folder and naming for one vehicle, however it was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleLocation {
    pub workbook: PathBuf,
    pub dir: PathBuf,
    pub photos: PathBuf,
    pub manufacturer: String,
    pub vehicle: String,
}

impl VehicleLocation {
    pub fn from_layout(layout: &StorageLayout, id: &VehicleId) -> Self {
        Self {
            workbook: layout.workbook_path(id),
            dir: layout.vehicle_dir(id),
            photos: layout.photos_dir(id),
            manufacturer: id.manufacturer.clone(),
            vehicle: id.vehicle.clone(),
        }
    }

    /// From a workbook path. The manufacturer is taken from the folder two
    /// levels above the vehicle folder when the path follows the layout.
    pub fn from_workbook(path: &Path) -> Self {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let vehicle = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let manufacturer = dir
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            workbook: path.to_path_buf(),
            photos: dir.join(PHOTOS_DIR),
            dir,
            manufacturer,
            vehicle,
        }
    }

    pub fn artifact_stem(&self) -> String {
        artifact_stem(&self.vehicle)
    }
}

/// File stem shared by the report artifacts of one vehicle.
pub fn artifact_stem(vehicle: &str) -> String {
    format!("{} - {}", vehicle, REPORT_TITLE)
}
