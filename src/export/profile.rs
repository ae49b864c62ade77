//! Metadata profiles
//!
//! A profile decides which annotation columns are selected, how the parent
//! record is resolved, where attachments land, and which metadata artifacts
//! are produced.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::models::ExportedFileMetadata;

/// Columns every profile selects
pub const BASE_FIELDS: [&str; 4] = ["annotationid", "filename", "mimetype", "documentbody"];

/// Parent references, in resolution order
pub const PARENT_FIELDS: [&str; 3] = ["objectid_account", "objectid_contact", "objectid_opportunity"];

/// Lookup value of the owning user or team
pub const OWNER_FIELD: &str = "_ownerid_value";

pub const AGGREGATE_ATTACHMENTS_DIR: &str = "annotation-attachments";
pub const PER_FILE_ATTACHMENTS_DIR: &str = "files";
pub const METADATA_FILE_STEM: &str = "annotationAttachments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataProfile {
    /// One `<filename>.json` next to each attachment, no CSV
    PerFile,
    /// Aggregate JSON and CSV with file name and type
    #[default]
    Basic,
    /// Aggregate outputs with the resolved parent record
    Parent,
    /// Aggregate outputs with owner, parent and annotation ids
    Extended,
}

/// How metadata is written for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataLayout {
    /// `<attachments dir>/<filename>.json` per record
    PerFile,
    /// `annotationAttachments.json` and `.csv` in the run root
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OwnerId,
    ParentId,
    AnnotationId,
    DynamicsRecordId,
    FileName,
    FileType,
}

impl Column {
    pub fn json_key(&self) -> &'static str {
        match self {
            Column::OwnerId => "ownerId",
            Column::ParentId => "parentId",
            Column::AnnotationId => "annotationId",
            Column::DynamicsRecordId => "dynamicsRecordId",
            Column::FileName => "fileName",
            Column::FileType => "fileType",
        }
    }

    pub fn csv_header(&self) -> &'static str {
        match self {
            Column::OwnerId => "OwnerId",
            Column::ParentId => "ParentId",
            Column::AnnotationId => "AnnotationId",
            Column::DynamicsRecordId => "DynamicsRecordId",
            Column::FileName => "FileName",
            Column::FileType => "FileType",
        }
    }

    pub fn value<'a>(&self, entry: &'a ExportedFileMetadata) -> Option<&'a str> {
        match self {
            Column::OwnerId => entry.owner_id.as_deref(),
            Column::ParentId | Column::DynamicsRecordId => entry.parent_id.as_deref(),
            Column::AnnotationId => entry.annotation_id.as_deref(),
            Column::FileName => Some(entry.file_name.as_str()),
            Column::FileType => entry.file_type.as_deref(),
        }
    }
}

impl MetadataProfile {
    pub fn name(&self) -> &'static str {
        match self {
            MetadataProfile::PerFile => "per-file",
            MetadataProfile::Basic => "basic",
            MetadataProfile::Parent => "parent",
            MetadataProfile::Extended => "extended",
        }
    }

    pub fn parent_fields(&self) -> &'static [&'static str] {
        match self {
            MetadataProfile::PerFile => &PARENT_FIELDS[..1],
            MetadataProfile::Basic => &[],
            MetadataProfile::Parent | MetadataProfile::Extended => &PARENT_FIELDS,
        }
    }

    pub fn owner_field(&self) -> Option<&'static str> {
        match self {
            MetadataProfile::Extended => Some(OWNER_FIELD),
            _ => None,
        }
    }

    /// `$select` columns, in request order
    pub fn select_fields(&self) -> Vec<&'static str> {
        let mut fields = BASE_FIELDS.to_vec();
        fields.extend_from_slice(self.parent_fields());
        fields.extend(self.owner_field());
        fields
    }

    pub fn attachments_dir(&self) -> &'static str {
        match self.layout() {
            MetadataLayout::PerFile => PER_FILE_ATTACHMENTS_DIR,
            MetadataLayout::Aggregate => AGGREGATE_ATTACHMENTS_DIR,
        }
    }

    pub fn layout(&self) -> MetadataLayout {
        match self {
            MetadataProfile::PerFile => MetadataLayout::PerFile,
            _ => MetadataLayout::Aggregate,
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            MetadataProfile::PerFile => &[Column::DynamicsRecordId, Column::FileName, Column::FileType],
            MetadataProfile::Basic => &[Column::FileName, Column::FileType],
            MetadataProfile::Parent => &[Column::ParentId, Column::FileName, Column::FileType],
            MetadataProfile::Extended => &[
                Column::OwnerId,
                Column::ParentId,
                Column::AnnotationId,
                Column::FileName,
                Column::FileType,
            ],
        }
    }

    pub fn csv_header(&self) -> Vec<&'static str> {
        self.columns().iter().map(Column::csv_header).collect()
    }

    /// CSV fields for one entry; missing values become empty fields
    pub fn csv_row<'a>(&self, entry: &'a ExportedFileMetadata) -> Vec<&'a str> {
        self.columns()
            .iter()
            .map(|column| column.value(entry).unwrap_or(""))
            .collect()
    }

    /// JSON object for one entry; every profile column is present, missing values are `null`
    pub fn to_json(&self, entry: &ExportedFileMetadata) -> Value {
        let mut object = Map::new();
        for column in self.columns() {
            let value = column
                .value(entry)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null);
            object.insert(column.json_key().to_string(), value);
        }
        Value::Object(object)
    }
}

impl std::fmt::Display for MetadataProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
