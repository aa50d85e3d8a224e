use super::Error;
use crate::error::{auth::AuthError, esi::EsiError};

/// Strategy for handling errors in a scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRetryStrategy {
    /// Transient failure, retry on the next scheduled tick
    Retry,
    /// Failed permanently for this credential until something changes
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Error::EsiError(esi_error) => match esi_error {
                // Network error, timeout, or connection issue - should retry
                EsiError::Request(reqwest_error) => {
                    if let Some(status) = reqwest_error.status() {
                        if status.is_server_error() {
                            // ESI is temporarily unavailable, retry next tick
                            ErrorRetryStrategy::Retry
                        } else {
                            // We're making invalid requests, a code flaw
                            ErrorRetryStrategy::Fail
                        }
                    } else {
                        ErrorRetryStrategy::Retry
                    }
                }
                EsiError::Status { status, .. } => {
                    if (500..600).contains(status) {
                        ErrorRetryStrategy::Retry
                    } else {
                        ErrorRetryStrategy::Fail
                    }
                }
                // Unexpected response shape won't fix itself by retrying
                EsiError::MalformedResponse(_) => ErrorRetryStrategy::Fail,
            },

            // Requires human re-authentication or a code fix
            Error::AuthError(auth_error) => match auth_error {
                AuthError::NotAuthenticated { .. } => ErrorRetryStrategy::Fail,
                AuthError::RefreshDenied { .. } => ErrorRetryStrategy::Fail,
                AuthError::MalformedResponse(_) => ErrorRetryStrategy::Fail,
            },

            // Disk failures are surfaced, not hammered
            Error::StoreError(_) => ErrorRetryStrategy::Fail,

            // Configuration errors won't resolve with retry
            Error::ConfigError(_) => ErrorRetryStrategy::Fail,
        }
    }

    /// Whether this error is terminal until a human re-authenticates the
    /// tenant; such errors are surfaced once instead of logged every tick.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Error::AuthError(AuthError::NotAuthenticated { .. })
                | Error::AuthError(AuthError::RefreshDenied { .. })
        )
    }
}
