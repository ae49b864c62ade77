//! Attachment export pipeline

pub mod exporter;
pub mod models;
pub mod output;
pub mod profile;

pub use exporter::{Exporter, attachment_query, decode_payload};
pub use models::{
    AnnotationRecord, ExportSummary, ExportedFileMetadata, FailurePolicy, RecordOutcome, SkippedRecord,
};
pub use output::OutputLayout;
pub use profile::{MetadataLayout, MetadataProfile};
