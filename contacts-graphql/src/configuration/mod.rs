//! Logic for loading configuration in to an object model
mod cors;

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use displaydoc::Display;
use itertools::Itertools;
use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub use self::cors::Cors;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not read configuration file {path}: {error}
    CannotReadFile {
        path: std::path::PathBuf,
        error: std::io::Error,
    },
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_json::Error),
}

/// The configuration for the contacts server.
///
/// Can be created through `serde::Deserialize` from various formats,
/// or inline in Rust code with `serde_json::json!` and `serde_json::from_value`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Configuration options pertaining to the http server component.
    #[serde(default)]
    pub(crate) server: Server,

    /// Cross origin request headers.
    #[serde(default)]
    pub(crate) cors: Cors,

    /// Health check endpoint.
    #[serde(default)]
    pub(crate) health_check: HealthCheck,

    /// Limits applied to incoming operations.
    #[serde(default)]
    pub(crate) limits: Limits,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(
        server: Option<Server>,
        cors: Option<Cors>,
        health_check: Option<HealthCheck>,
        limits: Option<Limits>,
    ) -> Self {
        Self {
            server: server.unwrap_or_default(),
            cors: cors.unwrap_or_default(),
            health_check: health_check.unwrap_or_default(),
            limits: limits.unwrap_or_default(),
        }
    }

    /// Reads and validates a YAML configuration file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigurationError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            ConfigurationError::CannotReadFile {
                path: path.to_path_buf(),
                error,
            }
        })?;
        validate_configuration(&raw)
    }

    pub fn listen(&self) -> &ListenAddr {
        &self.server.listen
    }

    pub fn graphql_path(&self) -> &str {
        &self.server.graphql_path
    }
}

/// Parse configuration from a string in YAML syntax
impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_configuration(s)
    }
}

fn default_listen() -> ListenAddr {
    SocketAddr::from(([127, 0, 0, 1], 4000)).into()
}

fn default_graphql_path() -> String {
    String::from("/")
}

fn default_introspection() -> bool {
    true
}

fn default_landing_page() -> bool {
    true
}

/// Configuration options pertaining to the http server component.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Server {
    /// The socket address and port to listen on
    /// Defaults to 127.0.0.1:4000, use port 0 to pick any free port
    #[serde(default = "default_listen")]
    pub(crate) listen: ListenAddr,

    /// The HTTP path on which GraphQL requests will be served.
    /// default: "/"
    #[serde(default = "default_graphql_path")]
    pub(crate) graphql_path: String,

    /// introspection queries
    /// enabled by default
    #[serde(default = "default_introspection")]
    pub(crate) introspection: bool,

    /// display the GraphiQL landing page on GET requests
    /// enabled by default
    #[serde(default = "default_landing_page")]
    pub(crate) landing_page: bool,
}

#[buildstructor::buildstructor]
impl Server {
    #[builder]
    pub fn new(
        listen: Option<ListenAddr>,
        graphql_path: Option<String>,
        introspection: Option<bool>,
        landing_page: Option<bool>,
    ) -> Self {
        Self {
            listen: listen.unwrap_or_else(default_listen),
            graphql_path: graphql_path.unwrap_or_else(default_graphql_path),
            introspection: introspection.unwrap_or_else(default_introspection),
            landing_page: landing_page.unwrap_or_else(default_landing_page),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Server::builder().build()
    }
}

fn default_health_check_enabled() -> bool {
    true
}

fn default_health_check_path() -> String {
    "/health".to_string()
}

/// Configuration options pertaining to the health component.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HealthCheck {
    /// Set to false to disable the health check
    #[serde(default = "default_health_check_enabled")]
    pub(crate) enabled: bool,

    /// Optionally set a custom healthcheck path
    /// Defaults to /health
    #[serde(default = "default_health_check_path")]
    pub(crate) path: String,
}

#[buildstructor::buildstructor]
impl HealthCheck {
    #[builder]
    pub fn new(enabled: Option<bool>, path: Option<String>) -> Self {
        Self {
            enabled: enabled.unwrap_or_else(default_health_check_enabled),
            path: path.unwrap_or_else(default_health_check_path),
        }
    }
}

impl Default for HealthCheck {
    fn default() -> Self {
        HealthCheck::builder().build()
    }
}

/// Operation limits. Unset means unlimited.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    /// Maximum nesting depth of a selection set
    pub(crate) max_depth: Option<usize>,

    /// Maximum complexity of an operation, each field counting for one
    pub(crate) max_complexity: Option<usize>,
}

#[buildstructor::buildstructor]
impl Limits {
    #[builder]
    pub fn new(max_depth: Option<usize>, max_complexity: Option<usize>) -> Self {
        Self {
            max_depth,
            max_complexity,
        }
    }
}

/// Listening address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct ListenAddr(SocketAddr);

impl ListenAddr {
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for ListenAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "http://{}", self.0)
    }
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });

    let gen = settings.into_generator();
    gen.into_root_schema_for::<Configuration>()
}

/// Validate config yaml against the generated json schema.
///
/// The validation sequence is:
/// 1. Parse the config into yaml
/// 2. Create the json schema
/// 3. Validate the yaml against the json schema, reporting every violation at once.
/// 4. Deserialize with serde and apply the checks the schema cannot express.
pub fn validate_configuration(raw_yaml: &str) -> Result<Configuration, ConfigurationError> {
    let blank = raw_yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    let yaml: serde_json::Value = if blank {
        serde_json::Value::Object(Default::default())
    } else {
        serde_yaml::from_str(raw_yaml).map_err(|e| ConfigurationError::InvalidConfiguration {
            message: "failed to parse yaml",
            error: e.to_string(),
        })?
    };
    // `~` and `null` documents
    let yaml = if yaml.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        yaml
    };

    let schema = serde_json::to_value(generate_config_schema()).map_err(|e| {
        ConfigurationError::InvalidConfiguration {
            message: "failed to parse schema",
            error: e.to_string(),
        }
    })?;
    let validator = jsonschema::validator_for(&schema).map_err(|e| {
        ConfigurationError::InvalidConfiguration {
            message: "failed to compile schema",
            error: e.to_string(),
        }
    })?;
    let errors: Vec<String> = validator
        .iter_errors(&yaml)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ConfigurationError::InvalidConfiguration {
            message: "configuration had errors",
            error: errors.iter().join("\n"),
        });
    }

    let config: Configuration =
        serde_json::from_value(yaml).map_err(ConfigurationError::DeserializeConfigError)?;

    // Custom validations
    check_route_path(
        "invalid 'server.graphql_path' configuration",
        &config.server.graphql_path,
    )?;
    check_route_path(
        "invalid 'health_check.path' configuration",
        &config.health_check.path,
    )?;
    if config.health_check.enabled && config.health_check.path == config.server.graphql_path {
        return Err(ConfigurationError::InvalidConfiguration {
            message: "invalid 'health_check.path' configuration",
            error: format!(
                "'{}' is already used by 'server.graphql_path'",
                config.health_check.path
            ),
        });
    }
    config
        .cors
        .ensure_usable_cors_rules()
        .map_err(|error| ConfigurationError::InvalidConfiguration {
            message: "invalid 'cors' configuration",
            error: error.to_string(),
        })?;

    Ok(config)
}

/// A route path must be absolute and literal: axum reads `:`, `*` and braces
/// as captures, and panics on some of them when the route is added.
pub(crate) fn check_route_path(
    message: &'static str,
    path: &str,
) -> Result<(), ConfigurationError> {
    if !path.starts_with('/') {
        return Err(ConfigurationError::InvalidConfiguration {
            message,
            error: format!(
                "'{path}' is invalid, it must be an absolute path and start with '/', you should try with '/{path}'"
            ),
        });
    }
    if let Some(reserved) = path.chars().find(|c| matches!(c, ':' | '*' | '{' | '}')) {
        return Err(ConfigurationError::InvalidConfiguration {
            message,
            error: format!("'{path}' is invalid, '{reserved}' is reserved for path parameters"),
        });
    }
    Ok(())
}
