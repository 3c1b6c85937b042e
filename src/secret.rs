use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Holds a sensitive value, such as the REST API key, and clears it from
/// memory when dropped.
///
/// The value deserializes transparently from configuration but never shows
/// up in `Debug` output; access goes through [`Secret::expose`].
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Zeroize + Default> Default for Secret<T> {
    fn default() -> Self {
        Self(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let secret = Secret::from("hwilaVidMinmila");
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("hwilaVidMinmila"));
    }

    #[test]
    fn test_expose_returns_value() {
        let secret = Secret::new("api-key".to_string());
        assert_eq!(secret.expose(), "api-key");
    }

    #[test]
    fn test_deserialize_transparent() {
        #[derive(Debug, Deserialize)]
        struct Config {
            rest_api_key: Secret<String>,
        }

        let config: Config = toml::from_str(r#"rest_api_key = "secret123""#).unwrap();
        assert_eq!(config.rest_api_key.expose(), "secret123");
    }

    #[test]
    fn test_default_is_empty() {
        let secret: Secret<String> = Secret::default();
        assert_eq!(secret.expose(), "");
    }
}
