use crate::models::{Entity, Event, Location, Participant, User};

use crate::schema::EntityKind;

use serde_derive::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate {kind} id in seed: {id}")]
    DuplicateId { kind: EntityKind, id: String },
}

/// One ordered collection of rows.
///
/// Lookups are linear scans over insertion order. Nothing outside this type
/// depends on that, so a map keyed by id can replace the `Vec` as long as
/// `rows` keeps returning rows in insertion order.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct Table<T> {
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table { rows: Vec::new() }
    }
}

impl<T: Entity> Table<T> {
    pub fn append(&mut self, row: T) {
        self.rows.push(row);
    }

    pub fn find_index_by_id(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&T> {
        self.find_index_by_id(id).map(|index| &self.rows[index])
    }

    /// Overwrites the row at `index`, keeping its position.
    pub fn replace_at(&mut self, index: usize, row: T) {
        self.rows[index] = row;
    }

    /// Removes the row at `index`, shifting later rows down by one.
    pub fn remove_at(&mut self, index: usize) -> T {
        self.rows.remove(index)
    }

    /// Removes every row and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.rows.len();
        self.rows.clear();
        count
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First id held by more than one row, if any.
    fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.id())
            .find(|id| !seen.insert(*id))
    }

    fn check_unique(&self) -> Result<(), SeedError> {
        match self.duplicate_id() {
            Some(id) => Err(SeedError::DuplicateId {
                kind: T::KIND,
                id: id.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// The four collections backing the graph.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Store {
    pub(crate) users: Table<User>,
    pub(crate) locations: Table<Location>,
    pub(crate) events: Table<Event>,
    pub(crate) participants: Table<Participant>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Loads a store from a JSON document with optional `users`,
    /// `locations`, `events` and `participants` arrays. Ids and references
    /// are taken as written, but ids must be unique within each collection.
    pub fn from_seed<R: Read>(reader: R) -> Result<Store, SeedError> {
        let store: Store = serde_json::from_reader(reader)?;
        store.users.check_unique()?;
        store.locations.check_unique()?;
        store.events.check_unique()?;
        store.participants.check_unique()?;
        Ok(store)
    }

    pub fn table<E: Entity>(&self) -> &Table<E> {
        E::table(self)
    }

    pub fn table_mut<E: Entity>(&mut self) -> &mut Table<E> {
        E::table_mut(self)
    }

    pub fn users(&self) -> &Table<User> {
        &self.users
    }

    pub fn locations(&self) -> &Table<Location> {
        &self.locations
    }

    pub fn events(&self) -> &Table<Event> {
        &self.events
    }

    pub fn participants(&self) -> &Table<Participant> {
        &self.participants
    }
}
