//! Contact records and the values derived from them.

use async_graphql::Enum;
use async_graphql::SimpleObject;

/// A contact record.
///
/// The `id` is assigned by the store's id generator when the record is created
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) phone: Option<String>,
    pub(crate) street: String,
    pub(crate) city: String,
}

impl Person {
    /// A phone counts only when it is present and non-empty.
    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|phone| !phone.is_empty())
    }

    /// Same record, with the phone replaced.
    pub(crate) fn with_phone(&self, phone: String) -> Self {
        Self {
            phone: Some(phone),
            ..self.clone()
        }
    }
}

/// The arguments of `addPerson`, before an id has been assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
}

#[buildstructor::buildstructor]
impl NewPerson {
    #[builder]
    pub fn new(name: String, phone: Option<String>, street: String, city: String) -> Self {
        Self {
            name,
            phone,
            street,
            city,
        }
    }

    pub(crate) fn into_person(self, id: String) -> Person {
        Person {
            id,
            name: self.name,
            phone: self.phone,
            street: self.street,
            city: self.city,
        }
    }
}

/// Postal address of a [`Person`], computed on read.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl From<&Person> for Address {
    fn from(person: &Person) -> Self {
        Address {
            street: person.street.clone(),
            city: person.city.clone(),
        }
    }
}

/// Filter on whether a person has a phone.
#[derive(Debug, Enum, Copy, Clone, Eq, PartialEq)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn matches(self, person: &Person) -> bool {
        match self {
            YesNo::Yes => person.has_phone(),
            YesNo::No => !person.has_phone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(phone: Option<&str>) -> Person {
        NewPerson::builder()
            .name("Ana")
            .and_phone(phone.map(str::to_string))
            .street("Calle Gran Vía, 123")
            .city("Madrid")
            .build()
            .into_person("1".to_string())
    }

    #[test]
    fn empty_phone_is_not_a_phone() {
        assert!(!person(None).has_phone());
        assert!(!person(Some("")).has_phone());
        assert!(person(Some("+34 91 789 01 23")).has_phone());
    }

    #[test]
    fn yes_and_no_are_complementary() {
        for p in [person(None), person(Some("")), person(Some("123"))] {
            assert_ne!(YesNo::Yes.matches(&p), YesNo::No.matches(&p));
        }
    }

    #[test]
    fn address_copies_street_and_city() {
        let address = Address::from(&person(None));
        assert_eq!(address.street, "Calle Gran Vía, 123");
        assert_eq!(address.city, "Madrid");
    }

    #[test]
    fn with_phone_keeps_everything_else() {
        let before = person(None);
        let after = before.with_phone("999".to_string());
        assert_eq!(after.phone.as_deref(), Some("999"));
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
        assert_eq!(Address::from(&after), Address::from(&before));
    }
}
