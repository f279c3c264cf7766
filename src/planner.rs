use crate::error::{Error, Result};
use crate::ids::{IdGenerator, UuidIds};
use crate::models::{DeleteAllOutput, Entity};
use crate::resolver::Resolver;
use crate::store::Store;

use tracing::debug;

/// The create/update/delete/get/list operations over every entity type.
///
/// Each operation is a single synchronous step: it either completes its one
/// row change or fails before touching the store. Callers sharing a planner
/// across threads must hold one lock for the whole call.
#[derive(Debug, Default)]
pub struct Planner<G = UuidIds> {
    store: Store,
    ids: G,
}

impl Planner<UuidIds> {
    pub fn new() -> Self {
        Planner::with_store(Store::new())
    }

    pub fn with_store(store: Store) -> Self {
        Planner::with_ids(store, UuidIds)
    }
}

impl<G: IdGenerator> Planner<G> {
    pub fn with_ids(store: Store, ids: G) -> Self {
        Planner { store, ids }
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store)
    }

    /// Appends a new row with a fresh id. References are not checked.
    pub fn create<E: Entity>(&mut self, input: E::Input) -> E {
        let id = self.ids.next_id();
        let row = E::from_input(id, input);
        self.store.table_mut::<E>().append(row.clone());
        debug!(kind = %E::KIND, id = %row.id(), "created");
        row
    }

    /// Merges `patch` over the stored row, keeping its id and position.
    pub fn update<E: Entity>(&mut self, id: &str, patch: E::Patch) -> Result<E> {
        let table = self.store.table_mut::<E>();
        let index = table
            .find_index_by_id(id)
            .ok_or_else(|| Error::not_found(E::KIND, id))?;
        let merged = table.rows()[index].merge(patch);
        table.replace_at(index, merged.clone());
        debug!(kind = %E::KIND, id = %id, "updated");
        Ok(merged)
    }

    /// Removes one row and returns it as it was before removal. Rows that
    /// reference it are left in place.
    pub fn delete<E: Entity>(&mut self, id: &str) -> Result<E> {
        let table = self.store.table_mut::<E>();
        let index = table
            .find_index_by_id(id)
            .ok_or_else(|| Error::not_found(E::KIND, id))?;
        let deleted = table.remove_at(index);
        debug!(kind = %E::KIND, id = %id, "deleted");
        Ok(deleted)
    }

    pub fn delete_all<E: Entity>(&mut self) -> DeleteAllOutput {
        let count = self.store.table_mut::<E>().clear();
        debug!(kind = %E::KIND, count, "deleted all");
        DeleteAllOutput { count }
    }

    pub fn get<E: Entity>(&self, id: &str) -> Result<&E> {
        self.store
            .table::<E>()
            .find_by_id(id)
            .ok_or_else(|| Error::not_found(E::KIND, id))
    }

    pub fn list<E: Entity>(&self) -> &[E] {
        self.store.table::<E>().rows()
    }
}
