/// Errors from packaging and deploying metadata.
#[derive(Debug, thiserror::Error)]
pub enum SalesforceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a SOAP fault or an unexpected status.
    #[error("Salesforce fault: {0}")]
    Fault(String),

    /// The SOAP response could not be read.
    #[error("Failed to parse Salesforce response: {0}")]
    Parse(String),

    /// The deployment finished without success.
    #[error("Deployment failed: {0}")]
    Deploy(String),

    /// The deployment did not finish within the polling deadline.
    #[error("Deployment {id} did not finish within {waited_secs}s")]
    Timeout { id: String, waited_secs: u64 },

    /// Credentials or endpoints are missing.
    #[error("Salesforce is not configured: {0}")]
    NotConfigured(&'static str),

    /// The deploy zip could not be built.
    #[error("Failed to build deploy package: {0}")]
    Package(#[from] zip::result::ZipError),
}

impl From<quick_xml::Error> for SalesforceError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
