//! GraphQL API over the contacts store.
//!
//! ```graphql
//! query {
//!   personCount
//!   allPersons(phone: YES) { name phone address { street city } }
//!   findPerson(name: "Ana") { id }
//! }
//!
//! mutation {
//!   addPerson(name: "Luis", street: "Calle Mayor, 1", city: "Sevilla") { id }
//!   editNumber(name: "Ana", phone: "+34 600 00 00 00") { phone }
//! }
//! ```

mod mutation;
mod person;
mod query;

use async_graphql::EmptySubscription;
use async_graphql::Schema;

pub use self::mutation::Mutation;
pub use self::query::Query;
use crate::configuration::Configuration;
use crate::store::RecordStore;

/// The full GraphQL schema type for the contacts API
pub type ContactsSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the GraphQL schema around `store`.
///
/// Operation limits and introspection follow `configuration`.
pub fn build_schema(store: RecordStore, configuration: &Configuration) -> ContactsSchema {
    let mut builder = Schema::build(Query, Mutation, EmptySubscription).data(store);

    if let Some(max_depth) = configuration.limits.max_depth {
        builder = builder.limit_depth(max_depth);
    }
    if let Some(max_complexity) = configuration.limits.max_complexity {
        builder = builder.limit_complexity(max_complexity);
    }
    if !configuration.server.introspection {
        builder = builder.disable_introspection();
    }

    builder.finish()
}
