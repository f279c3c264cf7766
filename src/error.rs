use crate::schema::EntityKind;

use thiserror::Error;

/// Failure of a graph operation. Nothing is mutated when one is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
}

impl Error {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
