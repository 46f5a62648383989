//! SOAP envelopes and response parsing for the partner and metadata APIs.
//!
//! Responses are read with the streaming [`quick_xml::Reader`] and matched on
//! local names, so namespace prefixes (`soapenv:`, `sf:`, none) do not matter.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::SalesforceError;
use crate::package::METADATA_NAMESPACE;
use crate::result::{ComponentFailure, DeployResult};

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const PARTNER_NS: &str = "urn:partner.soap.sforce.com";

/// Session returned by a partner `login` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub session_id: String,
    pub server_url: String,
    pub metadata_server_url: String,
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Partner API `login` request body.
pub fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:env="{ENVELOPE_NS}">
  <env:Body>
    <n1:login xmlns:n1="{PARTNER_NS}">
      <n1:username>{}</n1:username>
      <n1:password>{}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
        escape(username),
        escape(password)
    )
}

/// Metadata API `deploy` request body carrying a base64 zip.
pub fn deploy_envelope(session_id: &str, zip_base64: &str) -> String {
    metadata_envelope(
        session_id,
        &format!(
            "<met:deploy>\
             <met:ZipFile>{zip_base64}</met:ZipFile>\
             <met:DeployOptions>\
             <met:checkOnly>false</met:checkOnly>\
             <met:rollbackOnError>true</met:rollbackOnError>\
             <met:singlePackage>true</met:singlePackage>\
             </met:DeployOptions>\
             </met:deploy>"
        ),
    )
}

/// Metadata API `checkDeployStatus` request body.
pub fn check_deploy_status_envelope(session_id: &str, async_process_id: &str) -> String {
    metadata_envelope(
        session_id,
        &format!(
            "<met:checkDeployStatus>\
             <met:asyncProcessId>{}</met:asyncProcessId>\
             <met:includeDetails>true</met:includeDetails>\
             </met:checkDeployStatus>",
            escape(async_process_id)
        ),
    )
}

fn metadata_envelope(session_id: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="{ENVELOPE_NS}" xmlns:met="{METADATA_NAMESPACE}">
  <soapenv:Header>
    <met:SessionHeader><met:sessionId>{}</met:sessionId></met:SessionHeader>
  </soapenv:Header>
  <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#,
        escape(session_id)
    )
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Every text node with the local names of its enclosing elements.
fn text_nodes(xml: &str) -> Result<Vec<(Vec<String>, String)>, SalesforceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut nodes = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                nodes.push((path.clone(), t.unescape()?.into_owned()));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(nodes)
}

fn find_text<'a>(nodes: &'a [(Vec<String>, String)], name: &str) -> Option<&'a str> {
    nodes
        .iter()
        .find(|(path, _)| path.last().is_some_and(|n| n == name))
        .map(|(_, text)| text.as_str())
}

fn require_text(nodes: &[(Vec<String>, String)], name: &str) -> Result<String, SalesforceError> {
    find_text(nodes, name)
        .map(String::from)
        .ok_or_else(|| SalesforceError::Parse(format!("missing <{name}> in response")))
}

/// The `faultstring` of a SOAP fault, if the body is one.
pub fn parse_fault(xml: &str) -> Option<String> {
    let nodes = text_nodes(xml).ok()?;
    find_text(&nodes, "faultstring").map(String::from)
}

/// Parse a partner `loginResponse`.
pub fn parse_login_response(xml: &str) -> Result<LoginSession, SalesforceError> {
    let nodes = text_nodes(xml)?;
    Ok(LoginSession {
        session_id: require_text(&nodes, "sessionId")?,
        server_url: require_text(&nodes, "serverUrl")?,
        metadata_server_url: require_text(&nodes, "metadataServerUrl")?,
    })
}

/// Async process id from a `deployResponse`.
pub fn parse_deploy_id(xml: &str) -> Result<String, SalesforceError> {
    let nodes = text_nodes(xml)?;
    nodes
        .iter()
        .find(|(path, _)| path.ends_with(&["result".to_string(), "id".to_string()]))
        .map(|(_, text)| text.clone())
        .ok_or_else(|| SalesforceError::Parse("missing <id> in deploy response".into()))
}

/// Parse a `checkDeployStatusResponse` into a [`DeployResult`].
///
/// Top-level fields are read from direct children of `result`; each
/// `componentFailures` element becomes one [`ComponentFailure`].
pub fn parse_deploy_result(xml: &str) -> Result<DeployResult, SalesforceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut result = DeployResult::default();
    let mut seen_result = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "result" {
                    seen_result = true;
                }
                if name == "componentFailures" {
                    result.component_failures.push(ComponentFailure::default());
                }
                path.push(name);
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                let Some(field) = path.last().map(String::as_str) else {
                    continue;
                };
                let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
                match parent {
                    Some("result") => apply_result_field(&mut result, field, text)?,
                    Some("componentFailures") => {
                        if let Some(failure) = result.component_failures.last_mut() {
                            apply_failure_field(failure, field, text);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_result {
        return Err(SalesforceError::Parse(
            "missing <result> in checkDeployStatus response".into(),
        ));
    }
    Ok(result)
}

fn apply_result_field(
    result: &mut DeployResult,
    field: &str,
    text: String,
) -> Result<(), SalesforceError> {
    match field {
        "id" => result.id = text,
        "done" => result.done = text == "true",
        "success" => result.success = text == "true",
        "status" => result.status = text,
        "numberComponentsDeployed" => {
            result.number_components_deployed = parse_count(field, &text)?;
        }
        "numberComponentsTotal" => {
            result.number_components_total = parse_count(field, &text)?;
        }
        "numberComponentErrors" => {
            result.number_component_errors = parse_count(field, &text)?;
        }
        _ => {}
    }
    Ok(())
}

fn apply_failure_field(failure: &mut ComponentFailure, field: &str, text: String) {
    match field {
        "problem" => failure.problem = text,
        "fileName" => failure.file_name = text,
        "fullName" => failure.full_name = text,
        "problemType" => failure.problem_type = text,
        _ => {}
    }
}

fn parse_count(field: &str, text: &str) -> Result<u32, SalesforceError> {
    text.parse()
        .map_err(|_| SalesforceError::Parse(format!("<{field}> is not a number: {text}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
