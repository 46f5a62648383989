//! Deploy package construction.
//!
//! A Metadata API deploy takes a zip holding `package.xml` and the component
//! files under their type folder. Flows live in `flows/<ApiName>.flow-meta.xml`.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use dre2flow_core::flow::FLOW_FILE_SUFFIX;

use crate::error::SalesforceError;

/// Metadata namespace used by manifests and component files.
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// Render a `package.xml` manifest that includes every Flow.
pub fn package_manifest(api_version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Package xmlns="{METADATA_NAMESPACE}">
    <types>
        <members>*</members>
        <name>Flow</name>
    </types>
    <version>{api_version}</version>
</Package>
"#
    )
}

/// Zip entry path for a flow with the given API name.
pub fn flow_entry_path(api_name: &str) -> String {
    format!("flows/{api_name}{FLOW_FILE_SUFFIX}")
}

/// Build the deploy zip for a single flow, in memory.
pub fn build_flow_package(
    api_name: &str,
    flow_content: &str,
    api_version: &str,
) -> Result<Vec<u8>, SalesforceError> {
    let bytes = write_zip(&[
        ("package.xml".to_string(), package_manifest(api_version)),
        (flow_entry_path(api_name), flow_content.to_string()),
    ])?;

    tracing::debug!(
        api_name,
        package_bytes = bytes.len(),
        "Built flow deploy package"
    );
    Ok(bytes)
}

fn write_zip(entries: &[(String, String)]) -> zip::result::ZipResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in entries {
        zip.start_file(path.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
