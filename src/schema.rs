use std::fmt;

/// The four row collections held by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Location,
    Event,
    Participant,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::User,
        EntityKind::Location,
        EntityKind::Event,
        EntityKind::Participant,
    ];

    pub fn name(self) -> &'static str {
        use EntityKind::*;
        match self {
            User => "User",
            Location => "Location",
            Event => "Event",
            Participant => "Participant",
        }
    }

    pub fn plural_name(self) -> &'static str {
        use EntityKind::*;
        match self {
            User => "Users",
            Location => "Locations",
            Event => "Events",
            Participant => "Participants",
        }
    }

    /// Name of the singular query, e.g. `event`.
    pub fn singular(self) -> &'static str {
        use EntityKind::*;
        match self {
            User => "user",
            Location => "location",
            Event => "event",
            Participant => "participant",
        }
    }

    /// Name of the list query and of the collection, e.g. `events`.
    pub fn collection(self) -> &'static str {
        use EntityKind::*;
        match self {
            User => "users",
            Location => "locations",
            Event => "events",
            Participant => "participants",
        }
    }

    pub fn from_collection(collection: &str) -> Option<EntityKind> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.collection() == collection)
    }

    pub fn object_type(self) -> ObjectType {
        ObjectType::Entity(self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every type an operation can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectType {
    Entity(EntityKind),
    DeleteAllOutput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Scalar,
    /// Forward reference, resolved to at most one row.
    One(EntityKind),
    /// Reverse reference, resolved to every row pointing back.
    Many(EntityKind),
}

impl FieldType {
    pub fn target(self) -> Option<ObjectType> {
        match self {
            FieldType::Scalar => None,
            FieldType::One(kind) | FieldType::Many(kind) => Some(kind.object_type()),
        }
    }
}

const USER_FIELDS: &[(&str, FieldType)] = &[
    ("id", FieldType::Scalar),
    ("username", FieldType::Scalar),
    ("email", FieldType::Scalar),
    ("events", FieldType::Many(EntityKind::Event)),
];

const LOCATION_FIELDS: &[(&str, FieldType)] = &[
    ("id", FieldType::Scalar),
    ("name", FieldType::Scalar),
    ("desc", FieldType::Scalar),
    ("lat", FieldType::Scalar),
    ("lng", FieldType::Scalar),
];

const EVENT_FIELDS: &[(&str, FieldType)] = &[
    ("id", FieldType::Scalar),
    ("title", FieldType::Scalar),
    ("desc", FieldType::Scalar),
    ("date", FieldType::Scalar),
    ("from", FieldType::Scalar),
    ("to", FieldType::Scalar),
    ("location_id", FieldType::Scalar),
    ("user_id", FieldType::Scalar),
    ("user", FieldType::One(EntityKind::User)),
    ("location", FieldType::One(EntityKind::Location)),
    ("participants", FieldType::Many(EntityKind::Participant)),
];

const PARTICIPANT_FIELDS: &[(&str, FieldType)] = &[
    ("id", FieldType::Scalar),
    ("user_id", FieldType::Scalar),
    ("event_id", FieldType::Scalar),
    ("user", FieldType::One(EntityKind::User)),
    ("event", FieldType::One(EntityKind::Event)),
];

const DELETE_ALL_FIELDS: &[(&str, FieldType)] = &[("count", FieldType::Scalar)];

impl ObjectType {
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Entity(kind) => kind.name(),
            ObjectType::DeleteAllOutput => "DeleteAllOutput",
        }
    }

    pub fn fields(self) -> &'static [(&'static str, FieldType)] {
        match self {
            ObjectType::Entity(EntityKind::User) => USER_FIELDS,
            ObjectType::Entity(EntityKind::Location) => LOCATION_FIELDS,
            ObjectType::Entity(EntityKind::Event) => EVENT_FIELDS,
            ObjectType::Entity(EntityKind::Participant) => PARTICIPANT_FIELDS,
            ObjectType::DeleteAllOutput => DELETE_ALL_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<FieldType> {
        self.fields()
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, field_type)| *field_type)
    }

    /// Fields rendered when the caller gives no selection.
    pub fn scalar_fields(self) -> impl Iterator<Item = &'static str> {
        self.fields()
            .iter()
            .filter(|(_, field_type)| *field_type == FieldType::Scalar)
            .map(|(field, _)| *field)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_round_trip_through_kinds() {
        for kind in EntityKind::ALL.iter() {
            assert_eq!(EntityKind::from_collection(kind.collection()), Some(*kind));
        }
        assert_eq!(EntityKind::from_collection("venues"), None);
    }

    #[test]
    fn relations_are_not_default_fields() {
        let event = EntityKind::Event.object_type();
        let defaults: Vec<_> = event.scalar_fields().collect();
        assert!(defaults.contains(&"location_id"));
        assert!(!defaults.contains(&"user"));
        assert_eq!(event.field("participants"), Some(FieldType::Many(EntityKind::Participant)));
        assert_eq!(event.field("owner"), None);
    }
}
