
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use hyper::http::request::Parts;
use hyper::{StatusCode, Uri};
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{AuthOutcome, AuthScheme, PostValidationHook};
use crate::credentials::Credentials;
use crate::error::Error;
use crate::request_ext::{HeaderExt, SESSION_TOKEN_HEADER};
use crate::secret::Secret;

/// Strategy kind identifier, as registered with the hosting framework.
pub static STRATEGY_KIND: &str = "parse-access-token";

/// Fixed reason attached to 401 outcomes for tokens the provider rejected.
static BAD_TOKEN_REASON: &str = "Bad token";

static SESSION_TOKEN: &str = "X-Parse-Session-Token";
static APPLICATION_ID: &str = "X-Parse-Application-Id";
static REST_API_KEY: &str = "X-Parse-REST-API-Key";

static PROVIDER_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "parse_provider_requests_total",
        "Total requests issued to the Parse identity provider",
        &["strategy", "result"]
    )
    .unwrap()
});

static PROVIDER_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "parse_provider_request_duration_seconds",
        "Parse identity provider request duration",
        &["strategy"]
    )
    .unwrap()
});

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub application_id: String,
    pub rest_api_key: Secret<String>,

    /// Base URL of the Parse REST API.
    #[serde(default = "Config::default_server_url")]
    pub server_url: String,

    #[serde(default = "Config::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Config {
    fn default_server_url() -> String {
        "https://api.parse.com/1".to_string()
    }

    fn default_timeout_ms() -> u64 {
        30_000
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.application_id.is_empty() {
            let msg = "Missing application_id".to_string();
            return Err(Error::Initialization(msg));
        }

        if self.rest_api_key.expose().is_empty() {
            let msg = "Missing rest_api_key".to_string();
            return Err(Error::Initialization(msg));
        }

        if let Err(e) = Uri::try_from(&self.server_url) {
            let msg = format!("Invalid server URL: {e}");
            return Err(Error::Initialization(msg));
        }

        Ok(())
    }
}

/// Validates session tokens against the Parse "current user" endpoint.
///
/// Immutable after construction; one instance serves any number of
/// concurrent requests. Connection pooling is the underlying client's
/// concern.
pub struct ParseTokenValidator {
    name: String,
    config: Config,
    client: Client,
    hook: Option<Arc<dyn PostValidationHook>>,
}

impl ParseTokenValidator {
    pub fn new(name: String, config: Config) -> Result<Self, Error> {
        config.validate()?;

        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Initialization(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name,
            config,
            client,
            hook: None,
        })
    }

    /// Attaches the post-validation hook. A strategy carries at most one;
    /// attaching again replaces the previous hook.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn PostValidationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    async fn fetch_current_user(&self, token: &str) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/users/me", self.config.server_url.trim_end_matches('/'));

        self.client
            .get(url)
            .header(SESSION_TOKEN, token)
            .header(APPLICATION_ID, self.config.application_id.as_str())
            .header(REST_API_KEY, self.config.rest_api_key.expose().as_str())
            .send()
            .await
    }

    /// One pass/fail decision per request: extract the token, ask the
    /// provider for the matching user, then let the hook refine the
    /// credentials. Requests without a token never reach the provider.
    #[instrument(skip(self, parts), fields(strategy = %self.name))]
    pub async fn authenticate(&self, parts: &Parts) -> AuthOutcome {
        let Some(token) = parts.session_token() else {
            debug!("No session token header, skipping provider call");
            return AuthOutcome::unauthorized(SESSION_TOKEN_HEADER);
        };

        let timer = PROVIDER_DURATION
            .with_label_values(&[&self.name])
            .start_timer();
        let response = self.fetch_current_user(&token).await;
        timer.observe_duration();

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!("Provider request failed for strategy '{}': {e}", self.name);
                PROVIDER_REQUESTS
                    .with_label_values(&[&self.name, "error"])
                    .inc();
                return AuthOutcome::Error(Error::Upstream(e.to_string()));
            }
        };

        if response.status() != StatusCode::OK {
            debug!("Provider rejected token with status {}", response.status());
            PROVIDER_REQUESTS
                .with_label_values(&[&self.name, "deny"])
                .inc();
            return AuthOutcome::unauthorized_with_reason(SESSION_TOKEN_HEADER, BAD_TOKEN_REASON);
        }

        let payload = match response.json::<serde_json::Value>().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "Failed to read provider response for strategy '{}': {e}",
                    self.name
                );
                PROVIDER_REQUESTS
                    .with_label_values(&[&self.name, "error"])
                    .inc();
                return AuthOutcome::Error(Error::InvalidPayload(format!(
                    "Failed to parse provider response: {e}"
                )));
            }
        };

        let Some(credentials) = Credentials::from_value(payload) else {
            warn!(
                "Provider response for strategy '{}' is not a JSON object",
                self.name
            );
            PROVIDER_REQUESTS
                .with_label_values(&[&self.name, "error"])
                .inc();
            return AuthOutcome::Error(Error::InvalidPayload(
                "Provider response is not a JSON object".to_string(),
            ));
        };

        PROVIDER_REQUESTS
            .with_label_values(&[&self.name, "allow"])
            .inc();

        let Some(hook) = &self.hook else {
            return AuthOutcome::Success(credentials);
        };

        match hook.validate(credentials).await {
            Ok(decorated) => match Credentials::from_value(decorated) {
                Some(decorated) => AuthOutcome::Success(decorated),
                None => {
                    warn!(
                        "Post-validation hook for strategy '{}' returned no credentials",
                        self.name
                    );
                    AuthOutcome::Error(Error::MissingCredentials)
                }
            },
            Err(e) => {
                warn!(
                    "Post-validation hook failed for strategy '{}': {e}",
                    self.name
                );
                AuthOutcome::Error(e)
            }
        }
    }
}

#[async_trait]
impl AuthScheme for ParseTokenValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        STRATEGY_KIND
    }

    async fn authenticate(&self, parts: &Parts) -> AuthOutcome {
        ParseTokenValidator::authenticate(self, parts).await
    }
}
