use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io::BufReader, path::Path, sync::Arc};
use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Serializable evaluation settings, usually loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Template used when an accessor resolves to null. `{path}` is replaced with
    /// the memory path that was read.
    #[serde(default)]
    pub null_substitution: Option<String>,

    /// Seeds `rand` so evaluations become reproducible.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            null_substitution: None,
            random_seed: None,
        }
    }
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl ExpressionConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_options(&self) -> Options {
        let mut options = Options::new().with_locale(&self.default_locale);
        if let Some(template) = &self.null_substitution {
            let template = template.clone();
            options = options.with_null_substitution(move |path| {
                Value::String(template.replace("{path}", path))
            });
        }
        options.random_seed = self.random_seed;
        options
    }
}

pub type NullSubstitution = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Per-evaluation options threaded through every evaluator.
#[derive(Clone, Default)]
pub struct Options {
    /// Called with the path of an accessor that resolved to null.
    pub null_substitution: Option<NullSubstitution>,
    /// Locale for functions that accept an optional locale argument.
    pub locale: Option<String>,
    pub random_seed: Option<u64>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_null_substitution<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.null_substitution = Some(Arc::new(f));
        self
    }

    pub fn with_locale<S: Into<String>>(mut self, locale: S) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Copy used by boolean contexts, where substituted values must not leak in.
    pub fn without_null_substitution(&self) -> Self {
        Self {
            null_substitution: None,
            locale: self.locale.clone(),
            random_seed: self.random_seed,
        }
    }

    pub fn substitute_null(&self, path: &str) -> Option<Value> {
        self.null_substitution.as_ref().map(|f| f(path))
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("null_substitution", &self.null_substitution.is_some())
            .field("locale", &self.locale)
            .field("random_seed", &self.random_seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ExpressionConfig::from_json_str("{}").unwrap();
        assert_eq!(config.default_locale, "en-US");
        assert!(config.null_substitution.is_none());
        assert!(config.random_seed.is_none());
    }

    #[test]
    fn test_null_substitution_template() {
        let config =
            ExpressionConfig::from_json_str(r#"{"null_substitution": "{path} is undefined"}"#)
                .unwrap();
        let options = config.to_options();
        assert_eq!(
            options.substitute_null("foo"),
            Some(Value::String("foo is undefined".to_string()))
        );
        assert!(options
            .without_null_substitution()
            .substitute_null("foo")
            .is_none());
    }

    #[test]
    fn test_bad_json_is_a_parse_error() {
        assert!(matches!(
            ExpressionConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
