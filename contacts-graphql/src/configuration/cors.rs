//! Cross Origin Resource Sharing (CORS) configuration

use http::request::Parts;
use http::HeaderValue;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use tower_http::cors;
use tower_http::cors::CorsLayer;

/// Cross origin request configuration.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Cors {
    /// Set to true to allow any origin.
    ///
    /// Defaults to true, browsers on any page may call the API.
    /// Set it to false to only allow `origins`.
    #[serde(default = "default_allow_any_origin")]
    pub(crate) allow_any_origin: bool,

    /// Set to true to add the `Access-Control-Allow-Credentials` header.
    #[serde(default)]
    pub(crate) allow_credentials: bool,

    /// The headers to allow.
    ///
    /// If this value is not set, the server will mirror client's `Access-Control-Request-Headers`.
    #[serde(default)]
    pub(crate) allow_headers: Vec<String>,

    /// Which response headers should be made available to scripts running in the browser,
    /// in response to a cross-origin request.
    #[serde(default)]
    pub(crate) expose_headers: Option<Vec<String>>,

    /// The origin(s) to allow requests from when `allow_any_origin` is false.
    #[serde(default)]
    pub(crate) origins: Vec<String>,

    /// Allowed request methods. Defaults to GET, POST, OPTIONS.
    #[serde(default = "default_cors_methods")]
    pub(crate) methods: Vec<String>,
}

impl Default for Cors {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn default_allow_any_origin() -> bool {
    true
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".into(), "POST".into(), "OPTIONS".into()]
}

#[buildstructor::buildstructor]
impl Cors {
    #[builder]
    pub fn new(
        allow_any_origin: Option<bool>,
        allow_credentials: Option<bool>,
        allow_headers: Option<Vec<String>>,
        expose_headers: Option<Vec<String>>,
        origins: Option<Vec<String>>,
        methods: Option<Vec<String>>,
    ) -> Self {
        Self {
            allow_any_origin: allow_any_origin.unwrap_or_else(default_allow_any_origin),
            allow_credentials: allow_credentials.unwrap_or_default(),
            allow_headers: allow_headers.unwrap_or_default(),
            expose_headers,
            origins: origins.unwrap_or_default(),
            methods: methods.unwrap_or_else(default_cors_methods),
        }
    }
}

impl Cors {
    pub(crate) fn into_layer(self) -> Result<CorsLayer, &'static str> {
        self.ensure_usable_cors_rules()?;

        let allow_headers = if self.allow_headers.is_empty() {
            cors::AllowHeaders::mirror_request()
        } else {
            cors::AllowHeaders::list(self.allow_headers.iter().filter_map(|header| {
                header
                    .parse()
                    .map_err(|_| tracing::error!("header name '{header}' is not valid"))
                    .ok()
            }))
        };
        let cors = CorsLayer::new()
            .vary([])
            .allow_credentials(self.allow_credentials)
            .allow_headers(allow_headers)
            .expose_headers(cors::ExposeHeaders::list(
                self.expose_headers
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|header| {
                        header
                            .parse()
                            .map_err(|_| tracing::error!("header name '{header}' is not valid"))
                            .ok()
                    }),
            ))
            .allow_methods(cors::AllowMethods::list(self.methods.iter().filter_map(
                |method| {
                    method
                        .parse()
                        .map_err(|_| tracing::error!("method '{method}' is not valid"))
                        .ok()
                },
            )));

        if self.allow_any_origin {
            Ok(cors.allow_origin(cors::Any))
        } else {
            let origins = self.origins;
            Ok(cors.allow_origin(cors::AllowOrigin::predicate(
                move |origin: &HeaderValue, _: &Parts| {
                    origin
                        .to_str()
                        .map(|o| origins.iter().any(|origin| origin.as_str() == o))
                        .unwrap_or_default()
                },
            )))
        }
    }

    // tower_http panics when credentials are combined with a wildcard, reject it up front
    pub(crate) fn ensure_usable_cors_rules(&self) -> Result<(), &'static str> {
        if self.allow_credentials {
            if self.allow_any_origin {
                return Err("Invalid CORS configuration: Cannot combine `Access-Control-Allow-Credentials: true` \
                        with `Access-Control-Allow-Origin: *`");
            }

            if self.allow_headers.iter().any(|x| x == "*") {
                return Err("Invalid CORS configuration: Cannot combine `Access-Control-Allow-Credentials: true` \
                        with `Access-Control-Allow-Headers: *`");
            }

            if self.methods.iter().any(|x| x == "*") {
                return Err("Invalid CORS configuration: Cannot combine `Access-Control-Allow-Credentials: true` \
                        with `Access-Control-Allow-Methods: *`");
            }

            if let Some(headers) = &self.expose_headers {
                if headers.iter().any(|x| x == "*") {
                    return Err("Invalid CORS configuration: Cannot combine `Access-Control-Allow-Credentials: true` \
                        with `Access-Control-Expose-Headers: *`");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_any_origin() {
        let cors = Cors::default();
        assert!(cors.allow_any_origin);
        assert_eq!(cors.methods, vec!["GET", "POST", "OPTIONS"]);
        assert!(cors.into_layer().is_ok());
    }

    #[test]
    fn credentials_with_any_origin_are_rejected() {
        let cors = Cors::builder().allow_credentials(true).build();
        insta::assert_snapshot!(
            cors.into_layer().unwrap_err(),
            @"Invalid CORS configuration: Cannot combine `Access-Control-Allow-Credentials: true` with `Access-Control-Allow-Origin: *`"
        );
    }

    #[test]
    fn credentials_with_listed_origins_are_accepted() {
        let mut cors = Cors::builder()
            .allow_any_origin(false)
            .allow_credentials(true)
            .build();
        cors.origins = vec!["https://contacts.example.com".to_string()];
        assert!(cors.into_layer().is_ok());
    }

    #[test]
    fn credentials_with_wildcard_headers_are_rejected() {
        let mut cors = Cors::builder()
            .allow_any_origin(false)
            .allow_credentials(true)
            .build();
        cors.allow_headers = vec!["*".to_string()];
        assert!(cors.ensure_usable_cors_rules().is_err());
    }
}
