//! Shared response envelope for API handlers.
//!
//! Successful responses carry `success: true` next to the payload's own
//! fields. Use [`SuccessResponse`] instead of ad-hoc
//! `serde_json::json!({ "success": true, ... })`.

use serde::Serialize;

/// Standard `{ "success": true, ...T }` response envelope.
///
/// `T` must serialize to a JSON object; its fields are flattened into the
/// envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(SuccessResponse::new(TranslationsResponse { translations })))
/// ```
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
