//! Contacts errors.
use async_graphql::ErrorExtensions;
use displaydoc::Display;
use thiserror::Error;

pub(crate) use crate::configuration::ConfigurationError;

/// Errors returned to GraphQL clients.
///
/// A person that cannot be found is not an error: resolvers answer `null`.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PersonError {
    /// Name must be unique
    DuplicateName {
        /// The name that is already taken.
        name: String,
    },
}

impl PersonError {
    pub(crate) fn extension_code(&self) -> &'static str {
        match self {
            PersonError::DuplicateName { .. } => "BAD_USER_INPUT",
        }
    }
}

impl ErrorExtensions for PersonError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| {
            extensions.set("code", self.extension_code());
            match self {
                PersonError::DuplicateName { name } => {
                    extensions.set("invalidArgs", name.as_str());
                }
            }
        })
    }
}

/// Errors that stop the contacts server.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ContactsError {
    /// could not create the HTTP server: {0}
    ServerCreationError(std::io::Error),

    /// failed to stop HTTP Server
    HttpServerLifecycleError,

    /// HTTP server failed: {0}
    HttpServerError(std::io::Error),

    /// invalid configuration: {0}
    Configuration(#[from] ConfigurationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_message() {
        let error = PersonError::DuplicateName {
            name: "Ana".to_string(),
        };
        insta::assert_snapshot!(error.to_string(), @"Name must be unique");
    }

    #[test]
    fn duplicate_name_extensions() {
        let error = PersonError::DuplicateName {
            name: "Ana".to_string(),
        }
        .extend();
        assert_eq!(error.message, "Name must be unique");
        let extensions = serde_json::to_value(error.extensions.unwrap()).unwrap();
        assert_eq!(
            extensions,
            serde_json::json!({ "code": "BAD_USER_INPUT", "invalidArgs": "Ana" })
        );
    }
}
