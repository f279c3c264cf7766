use crate::schema::EntityKind;
use crate::store::{Store, Table};

use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// A row type held in one of the store's collections.
///
/// `Input` is what a create operation receives and `Patch` is what an update
/// operation receives. Merging follows a single rule for every field: a value
/// present in the patch replaces the stored one, an absent value keeps it.
pub trait Entity: Clone + Send + 'static {
    const KIND: EntityKind;

    type Input: DeserializeOwned;
    type Patch: DeserializeOwned + Default;

    fn id(&self) -> &str;

    fn from_input(id: String, input: Self::Input) -> Self;

    fn merge(&self, patch: Self::Patch) -> Self;

    /// Value of a scalar attribute; `null` when it is unset or not a scalar
    /// of this type.
    fn scalar(&self, field: &str) -> Value;

    fn table(store: &Store) -> &Table<Self>;

    fn table_mut(store: &mut Store) -> &mut Table<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub location_id: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Participant {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLocationInput {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventInput {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    pub location_id: String,
    pub user_id: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub location_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateParticipantInput {
    pub user_id: String,
    pub event_id: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateParticipantInput {
    pub user_id: Option<String>,
    pub event_id: Option<String>,
}

/// Result of truncating a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DeleteAllOutput {
    pub count: usize,
}

fn keep<T: Clone>(new: Option<T>, old: &T) -> T {
    new.unwrap_or_else(|| old.clone())
}

fn optional(value: &Option<String>) -> Value {
    value.as_deref().map_or(Value::Null, Value::from)
}

fn keep_optional<T: Clone>(new: Option<T>, old: &Option<T>) -> Option<T> {
    new.or_else(|| old.clone())
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    type Input = CreateUserInput;
    type Patch = UpdateUserInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_input(id: String, input: CreateUserInput) -> Self {
        User {
            id,
            username: input.username,
            email: input.email,
        }
    }

    fn merge(&self, patch: UpdateUserInput) -> Self {
        User {
            id: self.id.clone(),
            username: keep(patch.username, &self.username),
            email: keep(patch.email, &self.email),
        }
    }

    fn scalar(&self, field: &str) -> Value {
        match field {
            "id" => Value::from(self.id.as_str()),
            "username" => Value::from(self.username.as_str()),
            "email" => Value::from(self.email.as_str()),
            _ => Value::Null,
        }
    }

    fn table(store: &Store) -> &Table<Self> {
        &store.users
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.users
    }
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;

    type Input = CreateLocationInput;
    type Patch = UpdateLocationInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_input(id: String, input: CreateLocationInput) -> Self {
        Location {
            id,
            name: input.name,
            desc: input.desc,
            lat: input.lat,
            lng: input.lng,
        }
    }

    fn merge(&self, patch: UpdateLocationInput) -> Self {
        Location {
            id: self.id.clone(),
            name: keep(patch.name, &self.name),
            desc: keep_optional(patch.desc, &self.desc),
            lat: keep(patch.lat, &self.lat),
            lng: keep(patch.lng, &self.lng),
        }
    }

    fn scalar(&self, field: &str) -> Value {
        match field {
            "id" => Value::from(self.id.as_str()),
            "name" => Value::from(self.name.as_str()),
            "desc" => optional(&self.desc),
            "lat" => Value::from(self.lat),
            "lng" => Value::from(self.lng),
            _ => Value::Null,
        }
    }

    fn table(store: &Store) -> &Table<Self> {
        &store.locations
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.locations
    }
}

impl Entity for Event {
    const KIND: EntityKind = EntityKind::Event;

    type Input = CreateEventInput;
    type Patch = UpdateEventInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_input(id: String, input: CreateEventInput) -> Self {
        Event {
            id,
            title: input.title,
            desc: input.desc,
            date: input.date,
            from: input.from,
            to: input.to,
            location_id: input.location_id,
            user_id: input.user_id,
        }
    }

    fn merge(&self, patch: UpdateEventInput) -> Self {
        Event {
            id: self.id.clone(),
            title: keep(patch.title, &self.title),
            desc: keep_optional(patch.desc, &self.desc),
            date: keep_optional(patch.date, &self.date),
            from: keep_optional(patch.from, &self.from),
            to: keep_optional(patch.to, &self.to),
            location_id: keep(patch.location_id, &self.location_id),
            user_id: keep(patch.user_id, &self.user_id),
        }
    }

    fn scalar(&self, field: &str) -> Value {
        match field {
            "id" => Value::from(self.id.as_str()),
            "title" => Value::from(self.title.as_str()),
            "desc" => optional(&self.desc),
            "date" => optional(&self.date),
            "from" => optional(&self.from),
            "to" => optional(&self.to),
            "location_id" => Value::from(self.location_id.as_str()),
            "user_id" => Value::from(self.user_id.as_str()),
            _ => Value::Null,
        }
    }

    fn table(store: &Store) -> &Table<Self> {
        &store.events
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.events
    }
}

impl Entity for Participant {
    const KIND: EntityKind = EntityKind::Participant;

    type Input = CreateParticipantInput;
    type Patch = UpdateParticipantInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_input(id: String, input: CreateParticipantInput) -> Self {
        Participant {
            id,
            user_id: input.user_id,
            event_id: input.event_id,
        }
    }

    fn merge(&self, patch: UpdateParticipantInput) -> Self {
        Participant {
            id: self.id.clone(),
            user_id: keep(patch.user_id, &self.user_id),
            event_id: keep(patch.event_id, &self.event_id),
        }
    }

    fn scalar(&self, field: &str) -> Value {
        match field {
            "id" => Value::from(self.id.as_str()),
            "user_id" => Value::from(self.user_id.as_str()),
            "event_id" => Value::from(self.event_id.as_str()),
            _ => Value::Null,
        }
    }

    fn table(store: &Store) -> &Table<Self> {
        &store.participants
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.participants
    }
}
