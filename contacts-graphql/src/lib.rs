//! A GraphQL contacts service: query, filter, add and edit persons held in memory.

#![warn(unreachable_pub)]

mod axum_factory;
pub mod configuration;
pub mod error;
mod executable;
pub mod graphql;
mod http_server_factory;
pub mod model;
pub mod store;

pub use axum_factory::serve;
pub use configuration::Configuration;
pub use configuration::ListenAddr;
pub use error::ContactsError;
pub use error::PersonError;
pub use executable::main;
pub use executable::Executable;
pub use graphql::build_schema;
pub use graphql::ContactsSchema;
pub use http_server_factory::HttpServerHandle;
pub use model::Person;
pub use store::IdGenerator;
pub use store::RecordStore;
pub use store::UuidGenerator;
