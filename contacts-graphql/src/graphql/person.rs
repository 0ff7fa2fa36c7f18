use async_graphql::Object;
use async_graphql::ID;

use crate::model::Address;
use crate::model::Person;

#[Object]
impl Person {
    async fn name(&self) -> &str {
        &self.name
    }

    async fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    async fn street(&self) -> &str {
        &self.street
    }

    async fn city(&self) -> &str {
        &self.city
    }

    async fn id(&self) -> ID {
        ID::from(&self.id)
    }

    /// Street and city of this person.
    async fn address(&self) -> Address {
        Address::from(self)
    }
}
