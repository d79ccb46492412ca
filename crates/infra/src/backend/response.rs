//! Response decoding shared by the auth and REST adapters
//!
//! The hosted backend reports failures in three body shapes depending on the
//! service and version:
//! - `{"error": "...", "error_description": "..."}` (OAuth-style token errors)
//! - `{"code": 400, "msg": "..."}` (auth API)
//! - `{"code": "PGRST116", "message": "...", "details": "..."}` (REST API)

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use studyhub_domain::constants::PROFILE_NOT_FOUND_CODE;
use studyhub_domain::{Result, StudyHubError};

use crate::errors::InfraError;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn code(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(code) => Some(code.clone()),
            other => Some(other.to_string()),
        }
    }

    fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message).or(self.error)
    }
}

/// Map a non-success status and its body to a domain error.
pub(crate) fn map_error(status: StatusCode, body: &str) -> StudyHubError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code();
    let message = parsed.into_message().unwrap_or_else(|| {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        format!("HTTP {} {reason}", status.as_u16())
    });

    if code.as_deref() == Some(PROFILE_NOT_FOUND_CODE) {
        return StudyHubError::NotFound(message);
    }

    match status.as_u16() {
        400 | 401 | 403 | 422 => StudyHubError::Auth(message),
        404 => StudyHubError::NotFound(message),
        408 | 429 => StudyHubError::Network(message),
        405..=499 => StudyHubError::InvalidInput(message),
        _ => StudyHubError::Network(message),
    }
}

/// Fail with the mapped error unless the response is a success.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map_error(status, &body))
}

/// Decode a successful JSON response, mapping failures to domain errors.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(InfraError::from)?;
    serde_json::from_slice(&bytes).map_err(|e| InfraError::from(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_error_description_is_preferred() {
        let err = map_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err, StudyHubError::Auth("Invalid login credentials".into()));
    }

    #[test]
    fn auth_api_msg_shape_is_understood() {
        let err = map_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"code":422,"msg":"Password should be at least 6 characters"}"#,
        );
        assert_eq!(err, StudyHubError::Auth("Password should be at least 6 characters".into()));
    }

    #[test]
    fn zero_row_object_fetch_is_not_found() {
        let err = map_error(
            StatusCode::NOT_ACCEPTABLE,
            r#"{"code":"PGRST116","details":"The result contains 0 rows","message":"JSON object requested, multiple (or no) rows returned"}"#,
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn server_errors_without_body_are_network_errors() {
        let err = map_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err, StudyHubError::Network("HTTP 502 Bad Gateway".into()));
        assert!(map_error(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
    }

    #[test]
    fn other_client_errors_are_invalid_input() {
        let err = map_error(StatusCode::CONFLICT, r#"{"message":"duplicate key"}"#);
        assert_eq!(err, StudyHubError::InvalidInput("duplicate key".into()));
    }
}
