//! Shared fixtures for the integration tests

#![allow(dead_code)]

use annotation_export::auth::Credentials;
use annotation_export::config::ExportSettings;
use annotation_export::export::{Exporter, MetadataProfile};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "test-tenant";
pub const TOKEN: &str = "test-access-token";
pub const ANNOTATIONS_PATH: &str = "/api/data/v9.1/annotations";

pub fn token_path() -> String {
    format!("/{}/oauth2/token", TENANT)
}

pub fn credentials(resource: &str) -> Credentials {
    Credentials::new(TENANT, "client-id", "client-secret", resource)
}

pub fn settings(server: &MockServer, output_root: &Path, profile: MetadataProfile) -> ExportSettings {
    ExportSettings::new(server.uri())
        .with_authority(server.uri())
        .with_output_root(output_root)
        .with_profile(profile)
        .with_timeout(Duration::from_secs(5))
}

pub fn exporter(server: &MockServer, output_root: &Path, profile: MetadataProfile) -> Exporter {
    Exporter::new(settings(server, output_root, profile)).expect("http client")
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// An annotation row as Dynamics returns it
pub fn annotation(id: &str, file_name: &str, mime_type: &str, content: &[u8]) -> Value {
    json!({
        "@odata.etag": "W/\"1000\"",
        "annotationid": id,
        "filename": file_name,
        "mimetype": mime_type,
        "documentbody": encode(content)
    })
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": "3599",
            "access_token": TOKEN
        })))
        .mount(server)
        .await;
}

pub async fn mount_annotations(server: &MockServer, records: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(ANNOTATIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@odata.context": format!("{}/api/data/v9.1/$metadata#annotations", server.uri()),
            "value": records
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).expect("metadata file")).expect("valid json")
}
