//! An in-memory graph of users, locations, events and participants.
//!
//! Rows reference each other by id. References are not checked when rows
//! are written; they are resolved, or found missing, when a query selects
//! the relation.

pub mod error;
pub mod ids;
pub mod models;
pub mod planner;
pub mod query;
pub mod resolver;
pub mod schema;
pub mod server;
pub mod settings;
pub mod store;

pub use crate::error::{Error, Result};
pub use crate::planner::Planner;
pub use crate::query::{execute, QueryError, Request, Selection};
pub use crate::store::Store;
