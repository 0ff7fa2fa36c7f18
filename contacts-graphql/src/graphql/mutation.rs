//! GraphQL mutation resolvers
//!
//! Each mutation holds the store's write lock from its lookup to its write.

use async_graphql::Context;
use async_graphql::ErrorExtensions;
use async_graphql::Object;
use async_graphql::PathSegment;
use async_graphql::Result;

use crate::error::PersonError;
use crate::model::NewPerson;
use crate::model::Person;
use crate::store::RecordStore;

/// GraphQL Mutation root
pub struct Mutation;

#[Object]
impl Mutation {
    /// Adds a person. Answers null, with an error, when the name is already taken.
    async fn add_person(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: Option<String>,
        street: String,
        city: String,
    ) -> Result<Option<Person>> {
        let store = ctx.data::<RecordStore>()?;
        let new_person = NewPerson {
            name,
            phone,
            street,
            city,
        };
        match add_person(store, new_person) {
            Ok(person) => Ok(Some(person)),
            Err(err) => {
                // an error returned from a mutation root field would null the whole `data`
                let mut error = err.extend().into_server_error(ctx.item.pos);
                error.path = ctx
                    .path_node
                    .map(|node| {
                        node.to_string_vec()
                            .into_iter()
                            .map(PathSegment::Field)
                            .collect()
                    })
                    .unwrap_or_default();
                ctx.add_error(error);
                Ok(None)
            }
        }
    }

    /// Replaces the phone of the person with this name. Returns null when nobody has it.
    async fn edit_number(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: String,
    ) -> Result<Option<Person>> {
        let store = ctx.data::<RecordStore>()?;
        Ok(edit_number(store, &name, phone))
    }
}

fn add_person(store: &RecordStore, new_person: NewPerson) -> Result<Person, PersonError> {
    let mut persons = store.write();
    if persons.find_by_name(&new_person.name).is_some() {
        tracing::debug!(name = %new_person.name, "rejecting duplicate name");
        return Err(PersonError::DuplicateName {
            name: new_person.name,
        });
    }

    let person = new_person.into_person(store.next_id());
    persons.append(person.clone());
    tracing::info!(id = %person.id, name = %person.name, "person added");
    Ok(person)
}

fn edit_number(store: &RecordStore, name: &str, phone: String) -> Option<Person> {
    let mut persons = store.write();
    let Some(current) = persons.find_by_name(name) else {
        tracing::debug!(%name, "no person to edit");
        return None;
    };

    let updated = current.with_phone(phone);
    persons.replace(&updated.id, updated.clone())?;
    tracing::info!(id = %updated.id, %name, "phone number edited");
    Some(updated)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::SequentialIds;

    fn luis() -> NewPerson {
        NewPerson::builder()
            .name("Luis")
            .street("X")
            .city("Y")
            .build()
    }

    #[test]
    fn add_person_assigns_a_generated_id() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let person = add_person(&store, luis()).unwrap();
        assert_eq!(person.id, "person-1");
        assert_eq!(person.phone, None);
        assert_eq!(store.snapshot().last(), Some(&person));
    }

    #[test]
    fn add_person_rejects_taken_names() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let before = store.snapshot();
        let mut ana = luis();
        ana.name = "Ana".to_string();
        assert_eq!(
            add_person(&store, ana),
            Err(PersonError::DuplicateName {
                name: "Ana".to_string()
            })
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn edit_number_keeps_identity() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let ana = store.read().find_by_name("Ana").cloned().unwrap();
        let edited = edit_number(&store, "Ana", "999".to_string()).unwrap();
        assert_eq!(edited.phone.as_deref(), Some("999"));
        assert_eq!(edited.id, ana.id);
        assert_eq!(edited.street, ana.street);
        assert_eq!(edited.city, ana.city);
        assert_eq!(store.snapshot()[0], edited);
    }

    #[test]
    fn edit_number_of_unknown_name_changes_nothing() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let before = store.snapshot();
        assert_eq!(edit_number(&store, "NoSuchName", "123".to_string()), None);
        assert_eq!(store.snapshot(), before);
    }
}
