//! GraphQL query resolvers

use async_graphql::Context;
use async_graphql::Object;
use async_graphql::Result;

use crate::model::Person;
use crate::model::YesNo;
use crate::store::RecordStore;

/// GraphQL Query root
pub struct Query;

#[Object]
impl Query {
    /// Number of persons in the store
    async fn person_count(&self, ctx: &Context<'_>) -> Result<usize> {
        let store = ctx.data::<RecordStore>()?;
        Ok(store.read().len())
    }

    /// Every person, optionally only those with (`YES`) or without (`NO`) a phone
    async fn all_persons(
        &self,
        ctx: &Context<'_>,
        phone: Option<YesNo>,
    ) -> Result<Vec<Option<Person>>> {
        let store = ctx.data::<RecordStore>()?;
        let persons = store.read();
        // list entries stay nullable: `[Person]!`
        let matching: Vec<Option<Person>> = persons
            .all()
            .filter(|person| phone.map_or(true, |filter| filter.matches(person)))
            .cloned()
            .map(Some)
            .collect();
        tracing::debug!(filter = ?phone, count = matching.len(), "listing persons");
        Ok(matching)
    }

    /// The person with exactly this name, if any
    async fn find_person(&self, ctx: &Context<'_>, name: Option<String>) -> Result<Option<Person>> {
        let store = ctx.data::<RecordStore>()?;
        let Some(name) = name else {
            return Ok(None);
        };
        let found = store.read().find_by_name(&name).cloned();
        if found.is_none() {
            tracing::debug!(%name, "no person found");
        }
        Ok(found)
    }
}
