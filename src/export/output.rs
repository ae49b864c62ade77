//! On-disk layout of an export run
//!
//! Attachments go to `<root>/<attachments dir>/<filename>`; aggregate metadata
//! goes to `<root>/annotationAttachments.{json,csv}` so it never mixes with the
//! exported files.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::models::ExportedFileMetadata;
use super::profile::{METADATA_FILE_STEM, MetadataProfile};
use crate::error::ExportError;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    attachments_dir: PathBuf,
    profile: MetadataProfile,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, profile: MetadataProfile) -> Self {
        let root = root.into();
        let attachments_dir = root.join(profile.attachments_dir());
        Self {
            root,
            attachments_dir,
            profile,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn attachments_dir(&self) -> &Path {
        &self.attachments_dir
    }

    pub fn json_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", METADATA_FILE_STEM))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.root.join(format!("{}.csv", METADATA_FILE_STEM))
    }

    /// Create the attachments directory (and parents); an existing one is reused
    pub fn prepare(&self) -> Result<(), ExportError> {
        fs::create_dir_all(&self.attachments_dir)
            .map_err(|e| ExportError::output(&self.attachments_dir, e))?;
        log::debug!("Attachments directory ready: {}", self.attachments_dir.display());
        Ok(())
    }

    /// Write decoded bytes under the record's file name; a repeated name overwrites
    pub fn write_attachment(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let file_name = validate_file_name(file_name)?;
        let path = self.attachments_dir.join(file_name);
        if path.exists() {
            log::warn!("Overwriting existing file: {}", path.display());
        }
        fs::write(&path, bytes).map_err(|e| ExportError::write(&path, e))?;
        Ok(path)
    }

    /// Write `<filename>.json` next to the attachment
    pub fn write_companion(&self, entry: &ExportedFileMetadata) -> Result<PathBuf, ExportError> {
        let file_name = validate_file_name(&entry.file_name)?;
        let path = self.attachments_dir.join(format!("{}.json", file_name));
        let content = serde_json::to_string_pretty(&self.profile.to_json(entry))?;
        fs::write(&path, content).map_err(|e| ExportError::write(&path, e))?;
        Ok(path)
    }

    /// Remove a file left behind by a record that failed half way
    pub fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Could not remove {}: {}", path.display(), e);
        }
    }

    /// Write the aggregate JSON array and CSV table, returning both paths
    pub fn write_aggregate(&self, entries: &[ExportedFileMetadata]) -> Result<Vec<PathBuf>, ExportError> {
        let json_path = self.json_path();
        fs::write(&json_path, render_json(self.profile, entries)?)
            .map_err(|e| ExportError::output(&json_path, e))?;
        log::info!("Created aggregated metadata JSON: {}", json_path.display());

        let csv_path = self.csv_path();
        fs::write(&csv_path, render_csv(self.profile, entries)?)
            .map_err(|e| ExportError::output(&csv_path, e))?;
        log::info!("Created metadata CSV file: {}", csv_path.display());

        Ok(vec![json_path, csv_path])
    }
}

/// Accept only names that stay a single path segment inside the attachments directory
pub fn validate_file_name(file_name: &str) -> Result<&str, ExportError> {
    let unsafe_name = || ExportError::UnsafeFileName(file_name.to_string());

    if file_name.is_empty() || file_name.contains(['/', '\\', '\0']) {
        return Err(unsafe_name());
    }

    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(file_name),
        _ => Err(unsafe_name()),
    }
}

/// Pretty-printed JSON array of the profile's metadata objects
pub fn render_json(profile: MetadataProfile, entries: &[ExportedFileMetadata]) -> Result<String, ExportError> {
    let values: Vec<serde_json::Value> = entries.iter().map(|entry| profile.to_json(entry)).collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

/// CSV with the profile header followed by one row per entry; the header is always written
pub fn render_csv(profile: MetadataProfile, entries: &[ExportedFileMetadata]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(profile.csv_header())?;
    for entry in entries {
        writer.write_record(profile.csv_row(entry))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Metadata(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Metadata(e.to_string()))
}
