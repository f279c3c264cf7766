//! Named operations, field selections and rendering of results.
//!
//! A request names one operation (`events`, `createUser`, `deleteAllLocations`
//! and so on), carries its arguments as JSON and optionally selects which
//! fields of the result to return. Relation fields are only resolved when
//! selected.

use crate::error::Error;
use crate::ids::IdGenerator;
use crate::models::{DeleteAllOutput, Entity, Event, Location, Participant, User};
use crate::planner::Planner;
use crate::resolver::Resolver;
use crate::schema::{EntityKind, FieldType, ObjectType};

use serde::de::DeserializeOwned;
use serde::Deserialize as _;
use serde_derive::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Malformed request: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Unknown argument for {operation}: {argument}")]
    UnknownArgument { operation: String, argument: String },
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid argument {name}: {source}")]
    InvalidArgument {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown field {field} on type {object}")]
    UnknownField { object: ObjectType, field: String },
    #[error("Field {field} on type {object} is a scalar and takes no selection")]
    NotAnObject { object: ObjectType, field: String },
    #[error(transparent)]
    Graph(#[from] Error),
}

/// Fields to return, each mapped to a nested selection or `null`.
///
/// `null` on a relation field returns the related rows' scalar fields.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    fields: BTreeMap<String, Option<Selection>>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), None);
        self
    }

    pub fn nested(mut self, name: impl Into<String>, selection: Selection) -> Self {
        self.fields.insert(name.into(), Some(selection));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&Selection>)> {
        self.fields
            .iter()
            .map(|(name, nested)| (name.as_str(), nested.as_ref()))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub operation: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub selection: Option<Selection>,
}

impl Request {
    pub fn new(operation: impl Into<String>) -> Self {
        Request {
            operation: operation.into(),
            arguments: Map::new(),
            selection: None,
        }
    }

    pub fn from_slice(body: &[u8]) -> Result<Request, QueryError> {
        serde_json::from_slice(body).map_err(QueryError::Malformed)
    }

    pub fn argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
    DeleteAll,
}

impl Action {
    const ALL: [Action; 6] = [
        Action::List,
        Action::Get,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::DeleteAll,
    ];

    fn arguments(self) -> &'static [&'static str] {
        use Action::*;
        match self {
            List | DeleteAll => &[],
            Get | Delete => &["id"],
            Create => &["data"],
            Update => &["id", "data"],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    pub action: Action,
    pub kind: EntityKind,
}

impl Operation {
    pub fn parse(name: &str) -> Option<Operation> {
        EntityKind::ALL.iter().find_map(|&kind| {
            Action::ALL
                .iter()
                .map(|&action| Operation { action, kind })
                .find(|operation| operation.name() == name)
        })
    }

    pub fn name(&self) -> String {
        let kind = self.kind;
        match self.action {
            Action::List => kind.collection().to_owned(),
            Action::Get => kind.singular().to_owned(),
            Action::Create => format!("create{}", kind.name()),
            Action::Update => format!("update{}", kind.name()),
            Action::Delete => format!("delete{}", kind.name()),
            Action::DeleteAll => format!("deleteAll{}", kind.plural_name()),
        }
    }

    pub fn output_type(&self) -> ObjectType {
        match self.action {
            Action::DeleteAll => ObjectType::DeleteAllOutput,
            _ => self.kind.object_type(),
        }
    }

    fn check_arguments(&self, arguments: &Map<String, Value>) -> Result<(), QueryError> {
        let expected = self.action.arguments();
        match arguments.keys().find(|name| !expected.contains(&name.as_str())) {
            Some(unknown) => Err(QueryError::UnknownArgument {
                operation: self.name(),
                argument: unknown.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Checks every selected field exists on its type before anything runs.
pub fn validate(object: ObjectType, selection: Option<&Selection>) -> Result<(), QueryError> {
    let selection = match selection {
        Some(selection) => selection,
        None => return Ok(()),
    };
    for (field, nested) in selection.fields() {
        match object.field(field) {
            None => {
                return Err(QueryError::UnknownField {
                    object,
                    field: field.to_owned(),
                })
            }
            Some(FieldType::Scalar) => {
                if nested.is_some() {
                    return Err(QueryError::NotAnObject {
                        object,
                        field: field.to_owned(),
                    });
                }
            }
            Some(relation) => {
                if let Some(target) = relation.target() {
                    validate(target, nested)?;
                }
            }
        }
    }
    Ok(())
}

/// Runs one request against the planner and renders its result.
///
/// Arguments and the selection are checked before the operation runs, so a
/// rejected request never mutates the store.
pub fn execute<G: IdGenerator>(
    planner: &mut Planner<G>,
    request: &Request,
) -> Result<Value, QueryError> {
    let operation = Operation::parse(&request.operation)
        .ok_or_else(|| QueryError::UnknownOperation(request.operation.clone()))?;
    operation.check_arguments(&request.arguments)?;
    let selection = request.selection.as_ref();
    validate(operation.output_type(), selection)?;

    let arguments = &request.arguments;
    match operation.kind {
        EntityKind::User => run::<User, G>(planner, operation.action, arguments, selection),
        EntityKind::Location => run::<Location, G>(planner, operation.action, arguments, selection),
        EntityKind::Event => run::<Event, G>(planner, operation.action, arguments, selection),
        EntityKind::Participant => {
            run::<Participant, G>(planner, operation.action, arguments, selection)
        }
    }
}

fn run<E: Render, G: IdGenerator>(
    planner: &mut Planner<G>,
    action: Action,
    arguments: &Map<String, Value>,
    selection: Option<&Selection>,
) -> Result<Value, QueryError> {
    let value = match action {
        Action::List => {
            let resolver = planner.resolver();
            let rows = planner.list::<E>();
            Value::Array(
                rows.iter()
                    .map(|row| row.render(&resolver, selection))
                    .collect(),
            )
        }
        Action::Get => {
            let id: String = argument(arguments, "id")?;
            let row = planner.get::<E>(&id)?;
            row.render(&planner.resolver(), selection)
        }
        Action::Create => {
            let data: E::Input = argument(arguments, "data")?;
            let row = planner.create::<E>(data);
            row.render(&planner.resolver(), selection)
        }
        Action::Update => {
            let id: String = argument(arguments, "id")?;
            let data: E::Patch = argument(arguments, "data")?;
            let row = planner.update::<E>(&id, data)?;
            row.render(&planner.resolver(), selection)
        }
        Action::Delete => {
            let id: String = argument(arguments, "id")?;
            let row = planner.delete::<E>(&id)?;
            row.render(&planner.resolver(), selection)
        }
        Action::DeleteAll => render_delete_all(planner.delete_all::<E>(), selection),
    };
    Ok(value)
}

fn argument<T: DeserializeOwned>(
    arguments: &Map<String, Value>,
    name: &'static str,
) -> Result<T, QueryError> {
    let value = arguments
        .get(name)
        .ok_or(QueryError::MissingArgument(name))?;
    T::deserialize(value).map_err(|source| QueryError::InvalidArgument { name, source })
}

fn render_delete_all(output: DeleteAllOutput, selection: Option<&Selection>) -> Value {
    let mut object = Map::new();
    let count_selected = selection.map_or(true, |selection| {
        selection.fields().any(|(field, _)| field == "count")
    });
    if count_selected {
        object.insert("count".to_owned(), Value::from(output.count));
    }
    Value::Object(object)
}

/// Conversion of a row into its response shape.
pub trait Render: Entity {
    /// Value of a selected relation field. Forward references that match no
    /// row render as `null`.
    fn relation(&self, resolver: &Resolver<'_>, field: &str, selection: Option<&Selection>)
        -> Value;

    fn render(&self, resolver: &Resolver<'_>, selection: Option<&Selection>) -> Value {
        let object = Self::KIND.object_type();
        let mut rendered = Map::new();
        match selection {
            None => {
                for field in object.scalar_fields() {
                    rendered.insert(field.to_owned(), self.scalar(field));
                }
            }
            Some(selection) => {
                for (field, nested) in selection.fields() {
                    let value = match object.field(field) {
                        Some(FieldType::Scalar) => self.scalar(field),
                        Some(_) => self.relation(resolver, field, nested),
                        None => continue,
                    };
                    rendered.insert(field.to_owned(), value);
                }
            }
        }
        Value::Object(rendered)
    }
}

fn one<T: Render>(row: Option<&T>, resolver: &Resolver<'_>, selection: Option<&Selection>) -> Value {
    row.map_or(Value::Null, |row| row.render(resolver, selection))
}

fn many<T: Render>(rows: Vec<&T>, resolver: &Resolver<'_>, selection: Option<&Selection>) -> Value {
    Value::Array(
        rows.into_iter()
            .map(|row| row.render(resolver, selection))
            .collect(),
    )
}

impl Render for User {
    fn relation(
        &self,
        resolver: &Resolver<'_>,
        field: &str,
        selection: Option<&Selection>,
    ) -> Value {
        match field {
            "events" => many(resolver.user_events(self), resolver, selection),
            _ => Value::Null,
        }
    }
}

impl Render for Location {
    fn relation(&self, _: &Resolver<'_>, _: &str, _: Option<&Selection>) -> Value {
        Value::Null
    }
}

impl Render for Event {
    fn relation(
        &self,
        resolver: &Resolver<'_>,
        field: &str,
        selection: Option<&Selection>,
    ) -> Value {
        match field {
            "user" => one(resolver.event_user(self), resolver, selection),
            "location" => one(resolver.event_location(self), resolver, selection),
            "participants" => many(resolver.event_participants(self), resolver, selection),
            _ => Value::Null,
        }
    }
}

impl Render for Participant {
    fn relation(
        &self,
        resolver: &Resolver<'_>,
        field: &str,
        selection: Option<&Selection>,
    ) -> Value {
        match field {
            "user" => one(resolver.participant_user(self), resolver, selection),
            "event" => one(resolver.participant_event(self), resolver, selection),
            _ => Value::Null,
        }
    }
}
