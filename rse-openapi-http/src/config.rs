use rse_openapi::SpecFormat;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default mount point of the rendered document.
pub const DEFAULT_PATH: &str = "/swagger.json";

/// Default lifetime of a rendered document in the cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Prefix of the environment variables overlaid on the loaded file.
const ENV_PREFIX: &str = "OPENAPI_";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A single flattened configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl ConfigValue {
    fn from_yaml(value: &serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Bool(b) => ConfigValue::Bool(*b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    ConfigValue::Float(f)
                } else {
                    ConfigValue::String(n.to_string())
                }
            }
            serde_yaml::Value::String(s) => ConfigValue::String(s.clone()),
            serde_yaml::Value::Null => ConfigValue::Null,
            other => ConfigValue::String(format!("{other:?}")),
        }
    }
}

/// Conversion from a [`ConfigValue`] into a concrete type.
pub trait FromConfigValue: Sized {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError>;
}

fn mismatch<T>(key: &str, expected: &'static str) -> Result<T, ConfigError> {
    Err(ConfigError::TypeMismatch {
        key: key.to_string(),
        expected,
    })
}

impl FromConfigValue for String {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::String(s) => Ok(s.clone()),
            ConfigValue::Integer(i) => Ok(i.to_string()),
            ConfigValue::Float(f) => Ok(f.to_string()),
            ConfigValue::Bool(b) => Ok(b.to_string()),
            ConfigValue::Null => mismatch(key, "String"),
        }
    }
}

impl FromConfigValue for u64 {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Integer(i) => u64::try_from(*i).or_else(|_| mismatch(key, "u64")),
            ConfigValue::String(s) => s.trim().parse().or_else(|_| mismatch(key, "u64")),
            _ => mismatch(key, "u64"),
        }
    }
}

impl FromConfigValue for bool {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::Bool(b) => Ok(*b),
            ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => mismatch(key, "bool"),
            },
            ConfigValue::Integer(i) => Ok(*i != 0),
            _ => mismatch(key, "bool"),
        }
    }
}

impl FromConfigValue for SpecFormat {
    fn from_config_value(value: &ConfigValue, key: &str) -> Result<Self, ConfigError> {
        match value {
            ConfigValue::String(s) => s.parse().or_else(|_| mismatch(key, "json or yaml")),
            _ => mismatch(key, "json or yaml"),
        }
    }
}

/// Flat `dot.separated.key` view of a YAML file with an environment overlay.
///
/// Resolution order (lowest to highest priority):
/// 1. the YAML file, when it exists
/// 2. `.env` (loaded into the process environment, never overwriting)
/// 3. `OPENAPI_*` environment variables (`OPENAPI_CORS` overrides `openapi.cors`)
#[derive(Debug, Clone, Default)]
pub struct ConfigValues {
    values: HashMap<String, ConfigValue>,
}

impl ConfigValues {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let path = path.as_ref();
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
            config.merge_yaml(&content)?;
        }

        let _ = dotenvy::dotenv();
        for (env_key, env_val) in std::env::vars() {
            if env_key.starts_with(ENV_PREFIX) {
                let config_key = env_key.to_lowercase().replace('_', ".");
                config.values.insert(config_key, ConfigValue::String(env_val));
            }
        }
        Ok(config)
    }

    /// Parses a YAML string without looking at the environment.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_yaml(content)?;
        Ok(config)
    }

    fn merge_yaml(&mut self, content: &str) -> Result<(), ConfigError> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
        flatten_yaml("", &yaml, &mut self.values);
        Ok(())
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get<T: FromConfigValue>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        T::from_config_value(value, key)
    }

    /// Like [`get`](Self::get), but a missing key yields `default`.
    pub fn get_or<T: FromConfigValue>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }
}

/// Flatten a YAML tree into dot-separated keys. Sequences are skipped.
fn flatten_yaml(prefix: &str, value: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key_str = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                let full_key = if prefix.is_empty() {
                    key_str
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(&full_key, v, out);
            }
        }
        serde_yaml::Value::Sequence(_) => {}
        leaf => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
            }
        }
    }
}

/// Configuration of the document endpoint.
///
/// # Example
///
/// ```
/// use rse_openapi_http::OpenApiConfig;
/// use std::time::Duration;
///
/// let config = OpenApiConfig::new()
///     .with_path("/openapi.json")
///     .with_ttl(Duration::from_secs(60))
///     .with_cors(true);
/// assert_eq!(config.path, "/openapi.json");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiConfig {
    pub path: String,
    pub ttl: Duration,
    pub cors: bool,
    pub format: SpecFormat,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PATH.to_string(),
            ttl: DEFAULT_TTL,
            cors: false,
            format: SpecFormat::Json,
        }
    }
}

impl OpenApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_format(mut self, format: SpecFormat) -> Self {
        self.format = format;
        self
    }

    /// Reads the `openapi.*` keys, falling back to the defaults.
    ///
    /// | key              | type            | default         |
    /// |------------------|-----------------|-----------------|
    /// | `openapi.path`   | string          | `/swagger.json` |
    /// | `openapi.ttl`    | seconds         | `300`           |
    /// | `openapi.cors`   | bool            | `false`         |
    /// | `openapi.format` | `json` / `yaml` | `json`          |
    pub fn from_values(values: &ConfigValues) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            path: values.get_or("openapi.path", defaults.path)?,
            ttl: Duration::from_secs(values.get_or("openapi.ttl", defaults.ttl.as_secs())?),
            cors: values.get_or("openapi.cors", defaults.cors)?,
            format: values.get_or("openapi.format", defaults.format)?,
        })
    }

    /// Loads `path` (if present), `.env` and `OPENAPI_*` variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_values(&ConfigValues::load(path)?)
    }

    pub(crate) fn content_type(&self) -> &'static str {
        match self.format {
            SpecFormat::Json => "application/json",
            SpecFormat::Yaml => "application/yaml",
        }
    }
}
