use serde_json::{Map, Value};

/// The authenticated identity handed back to the hosting framework.
///
/// The Parse "current user" endpoint returns the user profile as a JSON
/// object; a post-validation hook may replace it with an object of its own
/// shape. Either way, credentials are always an object — anything else is
/// rejected before it reaches the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    /// Accepts a JSON object, rejects every other value kind.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Credentials {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
