//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use studyhub_domain::StudyHubError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StudyHubError);

impl From<InfraError> for StudyHubError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StudyHubError> for InfraError {
    fn from(value: StudyHubError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoStudyHubError {
    fn into_studyhub(self) -> StudyHubError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → StudyHubError */
/* -------------------------------------------------------------------------- */

impl IntoStudyHubError for HttpError {
    fn into_studyhub(self) -> StudyHubError {
        if self.is_timeout() {
            return StudyHubError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return StudyHubError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return StudyHubError::Serialization(format!("invalid response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => StudyHubError::Auth(message),
                404 => StudyHubError::NotFound(message),
                408 | 429 => StudyHubError::Network(message),
                400..=499 => StudyHubError::InvalidInput(message),
                _ => StudyHubError::Network(message),
            };
        }

        StudyHubError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_studyhub())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → StudyHubError */
/* -------------------------------------------------------------------------- */

impl IntoStudyHubError for JsonError {
    fn into_studyhub(self) -> StudyHubError {
        StudyHubError::Serialization(format!("invalid JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_studyhub())
    }
}

impl IntoStudyHubError for TomlError {
    fn into_studyhub(self) -> StudyHubError {
        StudyHubError::Config(format!("invalid TOML: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        Self(value.into_studyhub())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → StudyHubError */
/* -------------------------------------------------------------------------- */

impl IntoStudyHubError for IoError {
    fn into_studyhub(self) -> StudyHubError {
        match self.kind() {
            ErrorKind::NotFound => StudyHubError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                StudyHubError::Storage(format!("permission denied: {self}"))
            }
            _ => StudyHubError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        Self(value.into_studyhub())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
