//! Relationship lookups between rows.
//!
//! Nothing here is cached: each call scans the referenced collection again,
//! so results always reflect the store as it is at the time of the call.

use crate::models::{Entity, Event, Location, Participant, User};
use crate::store::{Store, Table};

#[derive(Clone, Copy)]
pub struct Resolver<'s> {
    store: &'s Store,
}

impl<'s> Resolver<'s> {
    pub fn new(store: &'s Store) -> Self {
        Resolver { store }
    }

    /// Owner of an event, or `None` when `user_id` dangles.
    pub fn event_user(&self, event: &Event) -> Option<&'s User> {
        forward(self.store.users(), &event.user_id)
    }

    pub fn event_location(&self, event: &Event) -> Option<&'s Location> {
        forward(self.store.locations(), &event.location_id)
    }

    pub fn event_participants(&self, event: &Event) -> Vec<&'s Participant> {
        reverse(self.store.participants(), |participant| {
            participant.event_id == event.id
        })
    }

    /// Events owned by a user, in event insertion order.
    pub fn user_events(&self, user: &User) -> Vec<&'s Event> {
        reverse(self.store.events(), |event| event.user_id == user.id)
    }

    pub fn participant_user(&self, participant: &Participant) -> Option<&'s User> {
        forward(self.store.users(), &participant.user_id)
    }

    pub fn participant_event(&self, participant: &Participant) -> Option<&'s Event> {
        forward(self.store.events(), &participant.event_id)
    }
}

fn forward<'s, T: Entity>(table: &'s Table<T>, id: &str) -> Option<&'s T> {
    table.find_by_id(id)
}

fn reverse<'s, T, P>(table: &'s Table<T>, points_back: P) -> Vec<&'s T>
where
    T: Entity,
    P: Fn(&T) -> bool,
{
    table.rows().iter().filter(|row| points_back(*row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::from_seed(
            r#"{
                "users": [
                    {"id": "u1", "username": "ana", "email": "a@x.io"},
                    {"id": "u2", "username": "bo", "email": "b@x.io"}
                ],
                "locations": [{"id": "l1", "name": "Hall", "lat": 1.0, "lng": 2.0}],
                "events": [
                    {"id": "e1", "title": "Launch", "location_id": "l1", "user_id": "u1"},
                    {"id": "e2", "title": "Retro", "location_id": "l1", "user_id": "u2"},
                    {"id": "e3", "title": "Party", "location_id": "gone", "user_id": "u1"}
                ],
                "participants": [
                    {"id": "p1", "user_id": "u2", "event_id": "e1"},
                    {"id": "p2", "user_id": "u1", "event_id": "e2"},
                    {"id": "p3", "user_id": "ghost", "event_id": "e1"}
                ]
            }"#
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn user_events_only_returns_owned_events_in_order() {
        let store = store();
        let resolver = Resolver::new(&store);
        let ana = store.users().find_by_id("u1").unwrap();
        let titles: Vec<_> = resolver
            .user_events(ana)
            .into_iter()
            .map(|event| event.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Launch", "Party"]);
    }

    #[test]
    fn forward_reference_resolves_to_the_referenced_row() {
        let store = store();
        let resolver = Resolver::new(&store);
        let launch = store.events().find_by_id("e1").unwrap();
        assert_eq!(resolver.event_location(launch).unwrap().name, "Hall");
        assert_eq!(resolver.event_user(launch).unwrap().username, "ana");
    }

    #[test]
    fn dangling_forward_reference_is_missing() {
        let store = store();
        let resolver = Resolver::new(&store);
        let party = store.events().find_by_id("e3").unwrap();
        assert!(resolver.event_location(party).is_none());
        let ghost = store.participants().find_by_id("p3").unwrap();
        assert!(resolver.participant_user(ghost).is_none());
        assert_eq!(resolver.participant_event(ghost).unwrap().id, "e1");
    }

    #[test]
    fn event_participants_fan_out() {
        let store = store();
        let resolver = Resolver::new(&store);
        let launch = store.events().find_by_id("e1").unwrap();
        let ids: Vec<_> = resolver
            .event_participants(launch)
            .into_iter()
            .map(|participant| participant.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }
}
