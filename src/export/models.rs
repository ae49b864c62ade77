use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// A note row as returned by the `annotations` entity set
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "annotationid", default)]
    pub annotation_id: Option<String>,
    #[serde(rename = "filename", default)]
    pub file_name: Option<String>,
    #[serde(rename = "mimetype", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "documentbody", default)]
    pub document_body: Option<String>,
    /// Parent and owner references plus OData annotations such as `@odata.etag`
    #[serde(flatten)]
    pub references: HashMap<String, Value>,
}

impl AnnotationRecord {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Identifier for log lines, even when the id column is missing
    pub fn display_id(&self) -> &str {
        self.annotation_id.as_deref().unwrap_or("<unknown>")
    }

    /// A reference column's value, if present and non-null
    pub fn reference(&self, field: &str) -> Option<&str> {
        self.references.get(field).and_then(Value::as_str)
    }

    /// First non-null reference among `fields`, in the given order
    pub fn resolve_parent(&self, fields: &[&str]) -> Option<String> {
        fields
            .iter()
            .find_map(|field| self.reference(field))
            .map(str::to_string)
    }
}

/// Metadata kept for every exported attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFileMetadata {
    pub annotation_id: Option<String>,
    pub owner_id: Option<String>,
    pub parent_id: Option<String>,
    pub file_name: String,
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Skip the failing record and keep going
    #[default]
    SkipAndReport,
    /// Stop at the first failing record, without aggregate outputs
    FailFast,
}

impl FailurePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::SkipAndReport
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub annotation_id: Option<String>,
    pub file_name: Option<String>,
    pub reason: String,
}

/// Result of processing a single record
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Exported {
        metadata: ExportedFileMetadata,
        bytes_written: u64,
        /// Per-file metadata written next to the attachment
        companion: Option<PathBuf>,
    },
    Skipped(SkippedRecord),
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records_fetched: usize,
    pub bytes_written: u64,
    pub entries: Vec<ExportedFileMetadata>,
    pub skipped: Vec<SkippedRecord>,
    pub attachments_dir: PathBuf,
    /// Metadata files written (aggregate or per-file companions)
    pub artifacts: Vec<PathBuf>,
    /// The server reported further pages that were not requested
    pub more_pages: bool,
}

impl ExportSummary {
    pub fn files_written(&self) -> usize {
        self.entries.len()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_value() {
        let record = AnnotationRecord::from_value(json!({
            "@odata.etag": "W/\"123\"",
            "annotationid": "n-1",
            "filename": "scan.png",
            "mimetype": "image/png",
            "documentbody": "iVBORw0KGgo=",
            "objectid_account": "acc-1"
        }))
        .unwrap();

        assert_eq!(record.annotation_id.as_deref(), Some("n-1"));
        assert_eq!(record.file_name.as_deref(), Some("scan.png"));
        assert_eq!(record.reference("objectid_account"), Some("acc-1"));
        assert_eq!(record.reference("objectid_contact"), None);
    }

    #[test]
    fn test_parent_precedence_first_listed_wins() {
        let record = AnnotationRecord::from_value(json!({
            "annotationid": "n-1",
            "filename": "a.txt",
            "documentbody": "",
            "objectid_account": "A",
            "objectid_contact": "B"
        }))
        .unwrap();

        let fields = ["objectid_account", "objectid_contact", "objectid_opportunity"];
        assert_eq!(record.resolve_parent(&fields), Some("A".to_string()));
    }

    #[test]
    fn test_parent_skips_null_references() {
        let record = AnnotationRecord::from_value(json!({
            "filename": "a.txt",
            "documentbody": "",
            "objectid_account": null,
            "objectid_contact": null,
            "objectid_opportunity": "O"
        }))
        .unwrap();

        let fields = ["objectid_account", "objectid_contact", "objectid_opportunity"];
        assert_eq!(record.resolve_parent(&fields), Some("O".to_string()));
        assert_eq!(record.resolve_parent(&fields[..2]), None);
        assert_eq!(record.display_id(), "<unknown>");
    }

    #[test]
    fn test_record_with_wrong_types_is_rejected() {
        assert!(AnnotationRecord::from_value(json!({"filename": 42})).is_err());
        assert!(AnnotationRecord::from_value(json!("not an object")).is_err());
    }

    #[test]
    fn test_failure_policy_from_flag() {
        assert_eq!(FailurePolicy::from_fail_fast(true), FailurePolicy::FailFast);
        assert_eq!(FailurePolicy::from_fail_fast(false), FailurePolicy::SkipAndReport);
    }
}
