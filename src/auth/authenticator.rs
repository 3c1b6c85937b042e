use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use hyper::http::request::Parts;
use prometheus::{register_int_counter_vec, IntCounterVec};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::parse_token::{self, ParseTokenValidator};
use super::{AuthOutcome, AuthScheme};
use crate::error::Error;

static AUTH_ATTEMPTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "auth_attempts_total",
        "Total number of authentication attempts",
        &["strategy", "result"]
    )
    .unwrap()
});

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub parse_token: HashMap<String, parse_token::Config>,
}

/// Holds the registered strategies and dispatches per-request checks.
///
/// Strategies without a post-validation hook come straight from
/// configuration; hooked ones are built in code and added with
/// [`Authenticator::register`].
pub struct Authenticator {
    strategies: HashMap<String, Arc<dyn AuthScheme>>,
}

fn result_label(outcome: &AuthOutcome) -> &'static str {
    match outcome {
        AuthOutcome::Success(_) => "success",
        AuthOutcome::Unauthorized { .. } => "unauthorized",
        AuthOutcome::Error(_) => "error",
    }
}

impl Authenticator {
    /// Builds one validator per configured strategy. A broken strategy
    /// configuration fails the whole build: a server must not start with
    /// a strategy it cannot honor.
    pub fn new(config: &AuthConfig) -> Result<Self, Error> {
        let mut strategies: HashMap<String, Arc<dyn AuthScheme>> = HashMap::new();

        for (name, strategy_config) in &config.parse_token {
            let validator = ParseTokenValidator::new(name.clone(), strategy_config.clone())?;
            strategies.insert(name.clone(), Arc::new(validator));
        }

        Ok(Self { strategies })
    }

    /// Adds a strategy instance under its name, replacing any existing
    /// strategy with that name.
    pub fn register(&mut self, strategy: Arc<dyn AuthScheme>) {
        debug!(
            "Registered {} strategy '{}'",
            strategy.kind(),
            strategy.name()
        );
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    #[instrument(skip(self, parts))]
    pub async fn authenticate_request(&self, strategy: &str, parts: &Parts) -> AuthOutcome {
        let Some(scheme) = self.strategies.get(strategy) else {
            warn!("Unknown authentication strategy '{strategy}'");
            return AuthOutcome::Error(Error::Execution(format!(
                "Unknown authentication strategy '{strategy}'"
            )));
        };

        let outcome = scheme.authenticate(parts).await;

        AUTH_ATTEMPTS
            .with_label_values(&[strategy, result_label(&outcome)])
            .inc();
        debug!("Authentication outcome: {}", outcome.status_code());

        outcome
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use hyper::http::request::Builder;
    use hyper::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::credentials::Credentials;

    #[test]
    fn test_auth_config_deserialize_empty() {
        let toml = r"";
        let config: AuthConfig = toml::from_str(toml).unwrap();
        assert!(config.parse_token.is_empty());
    }

    #[test]
    fn test_auth_config_deserialize_with_strategy() {
        let toml = r#"
            [parse_token.default]
            application_id = "hemligt"
            rest_api_key = "hwilaVidMinmila"
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.parse_token.len(), 1);
        assert!(config.parse_token.contains_key("default"));
    }

    #[test]
    fn test_new_empty() {
        let authenticator = Authenticator::new(&AuthConfig::default());
        assert!(authenticator.is_ok());
    }

    #[test]
    fn test_new_with_strategies() {
        let toml = r#"
            [parse_token.default]
            application_id = "hemligt"
            rest_api_key = "hwilaVidMinmila"

            [parse_token.backoffice]
            application_id = "other-app"
            rest_api_key = "other-key"
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        let authenticator = Authenticator::new(&config).unwrap();
        assert_eq!(authenticator.strategies.len(), 2);
    }

    #[test]
    fn test_new_rejects_invalid_strategy() {
        let toml = r#"
            [parse_token.default]
            application_id = ""
            rest_api_key = "hwilaVidMinmila"
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        let authenticator = Authenticator::new(&config);
        assert!(matches!(authenticator, Err(Error::Initialization(_))));
    }

    struct StaticScheme;

    #[async_trait]
    impl AuthScheme for StaticScheme {
        fn name(&self) -> &str {
            "static"
        }

        fn kind(&self) -> &'static str {
            "static-scheme"
        }

        async fn authenticate(&self, _parts: &Parts) -> AuthOutcome {
            let credentials = Credentials::from_value(json!({ "username": "cooldude6" })).unwrap();
            AuthOutcome::Success(credentials)
        }
    }

    #[tokio::test]
    async fn test_authenticate_request_unknown_strategy() {
        let authenticator = Authenticator::new(&AuthConfig::default()).unwrap();

        let request = Builder::new().body(()).unwrap();
        let (parts, ()) = request.into_parts();

        let outcome = authenticator.authenticate_request("missing", &parts).await;

        assert_eq!(outcome.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(outcome, AuthOutcome::Error(Error::Execution(_))));
    }

    #[tokio::test]
    async fn test_authenticate_request_dispatches_to_registered_strategy() {
        let mut authenticator = Authenticator::new(&AuthConfig::default()).unwrap();
        authenticator.register(Arc::new(StaticScheme));

        let request = Builder::new().body(()).unwrap();
        let (parts, ()) = request.into_parts();

        let outcome = authenticator.authenticate_request("static", &parts).await;

        let expected = Credentials::from_value(json!({ "username": "cooldude6" })).unwrap();
        assert_eq!(outcome, AuthOutcome::Success(expected));
    }

    #[tokio::test]
    async fn test_register_replaces_existing_strategy() {
        let toml = r#"
            [parse_token.static]
            application_id = "hemligt"
            rest_api_key = "hwilaVidMinmila"
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        let mut authenticator = Authenticator::new(&config).unwrap();
        authenticator.register(Arc::new(StaticScheme));

        let request = Builder::new().body(()).unwrap();
        let (parts, ()) = request.into_parts();

        // The replacement answers without a token, so it must be StaticScheme.
        let outcome = authenticator.authenticate_request("static", &parts).await;
        assert_eq!(outcome.status_code(), StatusCode::OK);
    }
}
