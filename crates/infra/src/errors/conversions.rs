//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use rendezvous_domain::RendezvousError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use serde_json::Error as JsonError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RendezvousError);

impl From<InfraError> for RendezvousError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RendezvousError> for InfraError {
    fn from(value: RendezvousError) -> Self {
        InfraError(value)
    }
}

/// Shorthand for mapping any supported third-party error straight into the
/// domain error, e.g. `.map_err(into_domain)`.
pub fn into_domain<E: Into<InfraError>>(err: E) -> RendezvousError {
    err.into().0
}

trait IntoRendezvousError {
    fn into_rendezvous(self) -> RendezvousError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → RendezvousError */
/* -------------------------------------------------------------------------- */

impl IntoRendezvousError for SqlError {
    fn into_rendezvous(self) -> RendezvousError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => {
                        RendezvousError::Database("database is busy".into())
                    }
                    ErrorCode::DatabaseLocked => {
                        RendezvousError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        RendezvousError::Database(format!("constraint violation: {message}"))
                    }
                    _ => RendezvousError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                RendezvousError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                RendezvousError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                RendezvousError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => RendezvousError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => RendezvousError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_rendezvous())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → RendezvousError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(RendezvousError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RendezvousError */
/* -------------------------------------------------------------------------- */

impl IntoRendezvousError for HttpError {
    fn into_rendezvous(self) -> RendezvousError {
        if self.is_timeout() {
            return RendezvousError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return RendezvousError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return RendezvousError::Network(format!("malformed HTTP response body: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status);
        }

        RendezvousError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_rendezvous())
    }
}

/// Domain error for a non-success HTTP status: credentials problems become
/// `Auth`, everything else is a `Network` failure of the remote side.
pub fn status_error(status: reqwest::StatusCode) -> RendezvousError {
    let message = format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("unknown status")
    );
    match status.as_u16() {
        401 | 403 => RendezvousError::Auth(message),
        _ => RendezvousError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error, JoinError → RendezvousError */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(RendezvousError::Internal(format!("JSON (de)serialization failed: {value}")))
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        let message = if value.is_cancelled() {
            "blocking task was cancelled".to_string()
        } else {
            format!("blocking task panicked: {value}")
        };
        InfraError(RendezvousError::Internal(message))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        match into_domain(err) {
            RendezvousError::Database(msg) => assert!(msg.contains("busy")),
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert!(matches!(into_domain(SqlError::QueryReturnedNoRows), RendezvousError::NotFound(_)));
    }

    #[test]
    fn bad_json_maps_to_internal() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        assert!(matches!(into_domain(err), RendezvousError::Internal(_)));
    }

    #[test]
    fn forbidden_and_server_errors_split_auth_from_network() {
        assert!(matches!(status_error(StatusCode::FORBIDDEN), RendezvousError::Auth(_)));
        assert!(matches!(status_error(StatusCode::BAD_GATEWAY), RendezvousError::Network(_)));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        match into_domain(error) {
            RendezvousError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn panicking_blocking_task_maps_to_internal() {
        let err = tokio::task::spawn_blocking(|| {
            panic!("boom");
        }).await.unwrap_err();
        match into_domain(err) {
            RendezvousError::Internal(msg) => assert!(msg.contains("panicked")),
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}
