//! Fetch annotations with attachments and write them to disk
//!
//! The run is strictly sequential: one query, then one record at a time, then
//! the metadata artifacts. Per-record failures follow the configured
//! [`FailurePolicy`].

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;

use super::models::{
    AnnotationRecord, ExportSummary, ExportedFileMetadata, FailurePolicy, RecordOutcome, SkippedRecord,
};
use super::output::OutputLayout;
use super::profile::{MetadataLayout, MetadataProfile};
use crate::api::constants::ANNOTATIONS_ENTITY;
use crate::api::{AccessToken, DynamicsClient, Filter, Query};
use crate::config::ExportSettings;
use crate::error::ExportError;

/// Standard alphabet; padding and trailing bits are not enforced
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a `documentbody` value into raw file bytes
pub fn decode_payload(file_name: &str, payload: &str) -> Result<Vec<u8>, ExportError> {
    PAYLOAD_ENGINE
        .decode(payload.trim())
        .map_err(|source| ExportError::Decode {
            file_name: file_name.to_string(),
            source,
        })
}

/// The annotation query for a profile: its columns, rows with a document body only
pub fn attachment_query(profile: MetadataProfile) -> Query {
    Query::new(ANNOTATIONS_ENTITY)
        .select(profile.select_fields())
        .with_filter(Filter::not_null("documentbody"))
}

pub struct Exporter {
    settings: ExportSettings,
    http_client: reqwest::Client,
    correlation_id: String,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Result<Self, ExportError> {
        let http_client = settings.http_client()?;
        Ok(Self::with_http_client(settings, http_client))
    }

    pub fn with_http_client(settings: ExportSettings, http_client: reqwest::Client) -> Self {
        Self {
            settings,
            http_client,
            correlation_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.settings.output_root, self.settings.profile)
    }

    /// Run the whole export with the given token
    ///
    /// Without a token nothing is requested and nothing is written. A fetch
    /// failure also leaves the disk untouched.
    pub async fn export_attachments(&self, token: Option<&AccessToken>) -> Result<ExportSummary, ExportError> {
        let Some(token) = token else {
            log::error!("No token available, exiting.");
            return Err(ExportError::MissingToken);
        };

        let started_at = Utc::now();
        let profile = self.settings.profile;

        let client = DynamicsClient::with_custom_client(
            self.settings.crm_url.clone(),
            token.clone(),
            self.http_client.clone(),
        )
        .with_correlation_id(self.correlation_id.clone());

        let response = match client.execute_query(&attachment_query(profile)).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Error fetching attachments: {}", e);
                return Err(e);
            }
        };

        let records_fetched = response.len();
        let more_pages = response.has_more();
        log::info!("Found {} attachments", records_fetched);
        if more_pages {
            log::warn!("Server returned a next page link; only the first page is exported");
        }

        let layout = self.layout();
        layout.prepare()?;

        let mut entries = Vec::with_capacity(records_fetched);
        let mut skipped = Vec::new();
        let mut artifacts = Vec::new();
        let mut seen_artifacts: HashSet<PathBuf> = HashSet::new();
        let mut bytes_written = 0;

        for (index, value) in response.value.into_iter().enumerate() {
            match self.process_record(&layout, index, value)? {
                RecordOutcome::Exported {
                    metadata,
                    bytes_written: written,
                    companion,
                } => {
                    // a repeated file name rewrites the same companion
                    if let Some(path) = companion {
                        if seen_artifacts.insert(path.clone()) {
                            artifacts.push(path);
                        }
                    }
                    bytes_written += written;
                    entries.push(metadata);
                }
                RecordOutcome::Skipped(record) => skipped.push(record),
            }
        }

        if profile.layout() == MetadataLayout::Aggregate {
            artifacts.extend(layout.write_aggregate(&entries)?);
        }

        let summary = ExportSummary {
            started_at,
            finished_at: Utc::now(),
            records_fetched,
            bytes_written,
            entries,
            skipped,
            attachments_dir: layout.attachments_dir().to_path_buf(),
            artifacts,
            more_pages,
        };

        log::info!(
            "[{}] Export finished: {} written, {} skipped, {} bytes",
            self.correlation_id,
            summary.files_written(),
            summary.skipped.len(),
            summary.bytes_written
        );

        Ok(summary)
    }

    /// Process one record, applying the failure policy to record-level errors
    fn process_record(&self, layout: &OutputLayout, index: usize, value: Value) -> Result<RecordOutcome, ExportError> {
        let annotation_id = value.get("annotationid").and_then(Value::as_str).map(str::to_string);
        let file_name = value.get("filename").and_then(Value::as_str).map(str::to_string);

        match self.export_record(layout, index, value) {
            Ok((metadata, bytes_written, companion)) => Ok(RecordOutcome::Exported {
                metadata,
                bytes_written,
                companion,
            }),
            Err(e) if e.is_record_level() && self.settings.failure_policy == FailurePolicy::SkipAndReport => {
                log::warn!("Skipping record #{}: {}", index, e);
                Ok(RecordOutcome::Skipped(SkippedRecord {
                    index,
                    annotation_id,
                    file_name,
                    reason: e.to_string(),
                }))
            }
            Err(e) => {
                log::error!("Aborting export at record #{}: {}", index, e);
                Err(e)
            }
        }
    }

    fn export_record(
        &self,
        layout: &OutputLayout,
        index: usize,
        value: Value,
    ) -> Result<(ExportedFileMetadata, u64, Option<PathBuf>), ExportError> {
        let profile = self.settings.profile;
        let record = AnnotationRecord::from_value(value).map_err(|e| ExportError::InvalidRecord {
            index,
            message: e.to_string(),
        })?;

        let file_name = record.file_name.clone().ok_or_else(|| ExportError::MissingField {
            annotation_id: record.display_id().to_string(),
            field: "filename",
        })?;
        let payload = record.document_body.as_deref().ok_or_else(|| ExportError::MissingField {
            annotation_id: record.display_id().to_string(),
            field: "documentbody",
        })?;

        let bytes = decode_payload(&file_name, payload)?;

        let metadata = ExportedFileMetadata {
            annotation_id: record.annotation_id.clone(),
            owner_id: profile
                .owner_field()
                .and_then(|field| record.reference(field))
                .map(str::to_string),
            parent_id: record.resolve_parent(profile.parent_fields()),
            file_name,
            file_type: record.mime_type.clone(),
        };

        // Companion first; a failed record leaves neither file behind
        let companion = match profile.layout() {
            MetadataLayout::PerFile => Some(layout.write_companion(&metadata)?),
            MetadataLayout::Aggregate => None,
        };

        if let Err(e) = layout.write_attachment(&metadata.file_name, &bytes) {
            if let Some(path) = &companion {
                layout.discard(path);
            }
            return Err(e);
        }
        log::info!("Downloaded file: {} ({} bytes)", metadata.file_name, bytes.len());
        if companion.is_some() {
            log::info!("Created metadata JSON for: {}", metadata.file_name);
        }

        Ok((metadata, bytes.len() as u64, companion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload() {
        assert_eq!(decode_payload("a.txt", "aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_payload("a.txt", "aGVsbG8").unwrap(), b"hello");
        assert!(decode_payload("empty.bin", "").unwrap().is_empty());
    }

    #[test]
    fn test_decode_payload_rejects_garbage() {
        let err = decode_payload("bad.bin", "!!not base64!!").unwrap_err();
        assert!(matches!(err, ExportError::Decode { ref file_name, .. } if file_name == "bad.bin"));
        assert!(err.is_record_level());
    }

    #[test]
    fn test_attachment_query_for_parent_profile() {
        let query = attachment_query(MetadataProfile::Parent);
        let params = query.to_query_params();
        assert_eq!(
            params[0].1,
            "annotationid,filename,mimetype,documentbody,objectid_account,objectid_contact,objectid_opportunity"
        );
        assert_eq!(params[1], ("$filter".to_string(), "documentbody ne null".to_string()));
    }
}
