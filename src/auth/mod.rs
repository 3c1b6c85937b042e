pub mod authenticator;
pub mod parse_token;

use async_trait::async_trait;
use hyper::http::request::Parts;
use hyper::StatusCode;

pub use authenticator::{AuthConfig, Authenticator};

use crate::credentials::Credentials;
use crate::error::Error;

/// Final decision for one authentication attempt.
///
/// Exactly one outcome is produced per request: the authenticate operation
/// is a single async call returning this value, so no path can fire twice
/// or be skipped.
#[derive(Debug, PartialEq)]
pub enum AuthOutcome {
    /// The provider vouched for the token; carries the identity to hand
    /// to the framework.
    Success(Credentials),
    /// The request carries no token, or a token the provider rejected.
    Unauthorized {
        scheme: String,
        reason: Option<String>,
    },
    /// The attempt failed for reasons unrelated to the token itself;
    /// the host should answer with a server fault, not a challenge.
    Error(Error),
}

impl AuthOutcome {
    pub fn unauthorized(scheme: &str) -> Self {
        AuthOutcome::Unauthorized {
            scheme: scheme.to_string(),
            reason: None,
        }
    }

    pub fn unauthorized_with_reason(scheme: &str, reason: &str) -> Self {
        AuthOutcome::Unauthorized {
            scheme: scheme.to_string(),
            reason: Some(reason.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthOutcome::Success(_) => StatusCode::OK,
            AuthOutcome::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AuthOutcome::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Challenge value for the `WWW-Authenticate` header on the 401 path.
    pub fn www_authenticate(&self) -> Option<String> {
        match self {
            AuthOutcome::Unauthorized {
                scheme,
                reason: Some(reason),
            } => Some(format!("{scheme} error=\"{reason}\"")),
            AuthOutcome::Unauthorized {
                scheme,
                reason: None,
            } => Some(scheme.clone()),
            _ => None,
        }
    }
}

/// Caller-supplied post-validation step.
///
/// Invoked with the provider-issued credentials once the token checked out;
/// the returned JSON value replaces them. Returning anything other than an
/// object fails the attempt with a server fault. The returned object is
/// trusted as-is and not re-validated.
#[async_trait]
pub trait PostValidationHook: Send + Sync {
    async fn validate(&self, credentials: Credentials) -> Result<serde_json::Value, Error>;
}

/// The seam the hosting framework calls for each request to protect.
#[async_trait]
pub trait AuthScheme: Send + Sync {
    /// Strategy instance name, as registered.
    fn name(&self) -> &str;

    /// Strategy kind identifier, e.g. `parse-access-token`.
    fn kind(&self) -> &'static str;

    async fn authenticate(&self, parts: &Parts) -> AuthOutcome;
}
