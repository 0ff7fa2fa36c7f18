//! In-memory record store.
//!
//! The store is an explicitly constructed handle that is injected into the
//! GraphQL schema. Nothing here is persisted: every process starts from the
//! sample data again.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use parking_lot::RwLockReadGuard;
use parking_lot::RwLockWriteGuard;

use crate::model::Person;

/// Source of fresh person ids.
pub trait IdGenerator: fmt::Debug + Send + Sync + 'static {
    /// Returns an id that was never returned before.
    fn generate(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Persons keyed by id, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Persons {
    by_id: IndexMap<String, Person>,
}

impl Persons {
    /// Every person, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Person> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.by_id.get(id)
    }

    /// First person whose name is exactly `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Person> {
        self.by_id.values().find(|person| person.name == name)
    }

    /// Adds `person` at the end. Callers are in charge of name uniqueness.
    pub fn append(&mut self, person: Person) {
        if let Some(previous) = self.by_id.insert(person.id.clone(), person) {
            tracing::warn!(id = %previous.id, "a person was appended with an id already in use");
        }
    }

    /// Replaces the person stored under `id`, keeping its position.
    ///
    /// Returns the previous value, or `None` (and stores nothing) if `id` is unknown.
    pub fn replace(&mut self, id: &str, person: Person) -> Option<Person> {
        let slot = self.by_id.get_mut(id)?;
        Some(std::mem::replace(slot, person))
    }
}

impl FromIterator<Person> for Persons {
    fn from_iter<T: IntoIterator<Item = Person>>(iter: T) -> Self {
        let mut persons = Persons::default();
        for person in iter {
            persons.append(person);
        }
        persons
    }
}

/// Shared handle on the persons of this process.
///
/// Cloning the handle is cheap and every clone sees the same records.
#[derive(Clone)]
pub struct RecordStore {
    persons: Arc<RwLock<Persons>>,
    ids: Arc<dyn IdGenerator>,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("persons", &self.persons.read().len())
            .field("ids", &self.ids)
            .finish()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::with_sample_data(UuidGenerator)
    }
}

impl RecordStore {
    pub fn new(persons: Persons, ids: impl IdGenerator) -> Self {
        Self {
            persons: Arc::new(RwLock::new(persons)),
            ids: Arc::new(ids),
        }
    }

    pub fn empty(ids: impl IdGenerator) -> Self {
        Self::new(Persons::default(), ids)
    }

    /// The three contacts every process starts with.
    pub fn with_sample_data(ids: impl IdGenerator) -> Self {
        Self::new(sample_persons(), ids)
    }

    pub(crate) fn next_id(&self) -> String {
        self.ids.generate()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Persons> {
        self.persons.read()
    }

    /// Mutations hold this guard for their whole check-then-write step.
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Persons> {
        self.persons.write()
    }

    /// A copy of every person, in insertion order.
    pub fn snapshot(&self) -> Vec<Person> {
        self.read().all().cloned().collect()
    }
}

fn sample_persons() -> Persons {
    [
        Person {
            id: "3f5b5d0b-6e57-4f91-8471-2c8c0b3c2e9a".to_string(),
            name: "Ana".to_string(),
            phone: None,
            street: "Calle Gran Vía, 123".to_string(),
            city: "Madrid".to_string(),
        },
        Person {
            id: "6b8b165b-fc65-4b5b-b6a8-85d667e05c91".to_string(),
            name: "Carlos".to_string(),
            phone: Some("+34 622 34 56 78".to_string()),
            street: "Calle Alcalá, 456".to_string(),
            city: "Barcelona".to_string(),
        },
        Person {
            id: "ac55df1a-86e8-4b13-91ea-bb81a3e42c52".to_string(),
            name: "Elena".to_string(),
            phone: Some("+34 91 789 01 23".to_string()),
            street: "Avenida Diagonal, 789".to_string(),
            city: "Valencia".to_string(),
        },
    ]
    .into_iter()
    .collect()
}

/// Hands out `person-1`, `person-2`, ... so tests can predict ids.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct SequentialIds(std::sync::atomic::AtomicUsize);

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        format!("person-{n}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::NewPerson;

    fn names(persons: &Persons) -> Vec<&str> {
        persons.all().map(|person| person.name.as_str()).collect()
    }

    #[test]
    fn sample_data_is_seeded_in_order() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let persons = store.read();
        assert_eq!(names(&persons), vec!["Ana", "Carlos", "Elena"]);
        assert!(!persons.find_by_name("Ana").unwrap().has_phone());
        assert!(persons.find_by_name("Carlos").unwrap().has_phone());
    }

    #[test]
    fn find_by_name_is_exact() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let persons = store.read();
        assert!(persons.find_by_name("ana").is_none());
        assert!(persons.find_by_name("Ana ").is_none());
        assert_eq!(
            persons.find_by_name("Elena").map(|person| person.id.as_str()),
            Some("ac55df1a-86e8-4b13-91ea-bb81a3e42c52")
        );
    }

    #[test]
    fn append_goes_to_the_end_without_name_check() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let mut persons = store.write();
        let id = store.next_id();
        persons.append(
            NewPerson::builder()
                .name("Ana")
                .street("X")
                .city("Y")
                .build()
                .into_person(id),
        );
        assert_eq!(names(&persons), vec!["Ana", "Carlos", "Elena", "Ana"]);
        assert_eq!(
            persons.all().last().map(|person| person.id.as_str()),
            Some("person-1")
        );
    }

    #[test]
    fn replace_keeps_position() {
        let store = RecordStore::with_sample_data(SequentialIds::default());
        let mut persons = store.write();
        let carlos = persons.find_by_name("Carlos").cloned().unwrap();
        let previous = persons.replace(&carlos.id, carlos.with_phone("000".to_string()));
        assert_eq!(previous.as_ref(), Some(&carlos));
        assert_eq!(names(&persons), vec!["Ana", "Carlos", "Elena"]);
        assert_eq!(
            persons.get(&carlos.id).unwrap().phone.as_deref(),
            Some("000")
        );
    }

    #[test]
    fn replace_of_unknown_id_stores_nothing() {
        let store = RecordStore::empty(SequentialIds::default());
        let ghost = NewPerson::builder()
            .name("Ghost")
            .street("X")
            .city("Y")
            .build()
            .into_person("nope".to_string());
        assert_eq!(store.write().replace("nope", ghost), None);
        assert!(store.read().is_empty());
    }

    #[test]
    fn clones_share_records() {
        let store = RecordStore::empty(SequentialIds::default());
        let other = store.clone();
        let id = store.next_id();
        store.write().append(
            NewPerson::builder()
                .name("Luis")
                .street("X")
                .city("Y")
                .build()
                .into_person(id),
        );
        assert_eq!(other.snapshot().len(), 1);
    }

    #[test]
    fn uuid_ids_are_unique() {
        let ids = UuidGenerator;
        assert_ne!(ids.generate(), ids.generate());
    }
}
