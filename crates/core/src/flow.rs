//! Flow artifact contract.
//!
//! Decodes the flow generation reply into a [`FlowArtifact`] and enforces the
//! output contract: a bare file name, non-empty XML, and the four markers every
//! deployable auto-launched flow must contain.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reply::parse_json_reply;

/// Metadata API version targeted by generated flows and deploy manifests.
pub const FLOW_API_VERSION: &str = "62.0";

/// Required suffix of a deployable flow file name.
pub const FLOW_FILE_SUFFIX: &str = ".flow-meta.xml";

/// Literal XML fragments every generated flow must contain.
pub const REQUIRED_FLOW_MARKERS: [&str; 4] = [
    r#"<Flow xmlns="http://soap.sforce.com/2006/04/metadata">"#,
    "<apiVersion>62.0</apiVersion>",
    "<status>Active</status>",
    "<processType>AutoLaunchedFlow</processType>",
];

/// A generated flow: target file name plus XML content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowArtifact {
    pub filename: String,
    pub flow_content: String,
}

/// Decode and validate the flow generation reply.
///
/// The reply must be a JSON object with a `filename` and either a
/// `flowContent` string or a `flowContentBase64` string holding the
/// base64-encoded XML.
pub fn decode_flow_reply(reply: &str) -> Result<FlowArtifact, CoreError> {
    let value = parse_json_reply(reply)?;
    let obj = value.as_object().ok_or_else(|| {
        CoreError::MalformedResponse("flow reply must be a JSON object".to_string())
    })?;

    let filename = obj
        .get("filename")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            CoreError::MalformedResponse("Invalid flow info: missing or invalid filename".into())
        })?
        .to_string();

    let flow_content = match obj.get("flowContent").and_then(|v| v.as_str()) {
        Some(content) if !content.trim().is_empty() => content.to_string(),
        _ => match obj.get("flowContentBase64").and_then(|v| v.as_str()) {
            Some(encoded) => decode_base64_content(encoded)?,
            None => {
                return Err(CoreError::MalformedResponse(
                    "Invalid flow info: missing or invalid flowContent".into(),
                ))
            }
        },
    };

    let artifact = FlowArtifact {
        filename,
        flow_content,
    };
    validate_flow_artifact(&artifact)?;
    Ok(artifact)
}

/// Check the artifact's file name and required XML markers.
pub fn validate_flow_artifact(artifact: &FlowArtifact) -> Result<(), CoreError> {
    if !is_bare_file_name(&artifact.filename) {
        return Err(CoreError::MalformedResponse(format!(
            "Invalid flow info: filename '{}' must be a plain file name",
            artifact.filename
        )));
    }
    if artifact.flow_content.trim().is_empty() {
        return Err(CoreError::MalformedResponse(
            "Invalid flow info: missing or invalid flowContent".into(),
        ));
    }
    if let Some(marker) = missing_flow_marker(&artifact.flow_content) {
        return Err(CoreError::MalformedResponse(format!(
            "Missing required XML element: {marker}"
        )));
    }
    Ok(())
}

/// First required marker absent from `content`, if any.
pub fn missing_flow_marker(content: &str) -> Option<&'static str> {
    REQUIRED_FLOW_MARKERS
        .into_iter()
        .find(|marker| !content.contains(marker))
}

/// Derive the flow API name from a deployable file name.
///
/// `Lead_Routing.flow-meta.xml` becomes `Lead_Routing`.
pub fn flow_api_name(filename: &str) -> Result<&str, CoreError> {
    let api_name = filename.strip_suffix(FLOW_FILE_SUFFIX).ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid filename format. Must end with {FLOW_FILE_SUFFIX}"
        ))
    })?;
    if api_name.is_empty() || !is_bare_file_name(filename) {
        return Err(CoreError::Validation(format!(
            "Invalid filename '{filename}'. Expected <FlowApiName>{FLOW_FILE_SUFFIX}"
        )));
    }
    Ok(api_name)
}

/// True when `name` is a single path component (no separators, not `.`/`..`).
pub fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

fn decode_base64_content(encoded: &str) -> Result<String, CoreError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| {
            CoreError::MalformedResponse(format!("flowContentBase64 is not valid base64: {e}"))
        })?;
    String::from_utf8(bytes)
        .map_err(|e| CoreError::MalformedResponse(format!("flowContentBase64 is not UTF-8: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
