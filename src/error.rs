use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Configuration is absent or malformed at registration time.
    /// Fatal: the strategy is never usable, no request reaches it.
    Initialization(String),
    Execution(String),
    /// The call to the identity provider failed before an HTTP response
    /// was obtained (DNS, connect, timeout).
    Upstream(String),
    /// The provider accepted the token but its response body is not a
    /// JSON object.
    InvalidPayload(String),
    /// The post-validation hook yielded no usable credentials object.
    MissingCredentials,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Initialization(err) | Error::Execution(err) => write!(f, "{err}"),
            Error::Upstream(err) => write!(f, "Identity provider request failed: {err}"),
            Error::InvalidPayload(err) => write!(f, "Invalid identity provider payload: {err}"),
            Error::MissingCredentials => write!(f, "Missing credentials"),
        }
    }
}
