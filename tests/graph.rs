//! End-to-end scenarios through the named operation surface.

use event_graph::ids::SequentialIds;
use event_graph::models::{Event, User};
use event_graph::{execute, Error, Planner, QueryError, Request, Selection, Store};
use serde_json::{json, Value};

fn planner() -> Planner<SequentialIds> {
    Planner::with_ids(Store::new(), SequentialIds::new("id"))
}

fn run(planner: &mut Planner<SequentialIds>, request: Value) -> Value {
    let request: Request = serde_json::from_value(request).unwrap();
    execute(planner, &request).unwrap()
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_owned()
}

#[test]
fn launch_event_resolves_owner_and_location() {
    let mut planner = planner();
    let user = run(
        &mut planner,
        json!({
            "operation": "createUser",
            "arguments": {"data": {"username": "ana", "email": "a@x.io"}}
        }),
    );
    let location = run(
        &mut planner,
        json!({
            "operation": "createLocation",
            "arguments": {"data": {"name": "Hall", "lat": 1.0, "lng": 2.0}}
        }),
    );
    let event = run(
        &mut planner,
        json!({
            "operation": "createEvent",
            "arguments": {"data": {
                "title": "Launch",
                "date": "2024-01-01",
                "from": "10:00",
                "to": "11:00",
                "location_id": id_of(&location),
                "user_id": id_of(&user)
            }}
        }),
    );

    let query = json!({
        "operation": "event",
        "arguments": {"id": id_of(&event)},
        "selection": {"user": {"username": null}, "location": {"name": null}}
    });
    assert_eq!(
        run(&mut planner, query.clone()),
        json!({"user": {"username": "ana"}, "location": {"name": "Hall"}})
    );

    run(
        &mut planner,
        json!({"operation": "deleteUser", "arguments": {"id": id_of(&user)}}),
    );
    assert_eq!(planner.list::<Event>().len(), 1);
    assert_eq!(
        run(&mut planner, query),
        json!({"user": null, "location": {"name": "Hall"}})
    );
}

#[test]
fn participants_link_users_and_events() {
    let mut planner = planner();
    let host = run(
        &mut planner,
        json!({"operation": "createUser", "arguments": {"data": {"username": "ana", "email": "a@x.io"}}}),
    );
    let guest = run(
        &mut planner,
        json!({"operation": "createUser", "arguments": {"data": {"username": "bo", "email": "b@x.io"}}}),
    );
    let event = run(
        &mut planner,
        json!({
            "operation": "createEvent",
            "arguments": {"data": {"title": "Retro", "location_id": "l1", "user_id": id_of(&host)}}
        }),
    );
    run(
        &mut planner,
        json!({
            "operation": "createParticipant",
            "arguments": {"data": {"user_id": id_of(&guest), "event_id": id_of(&event)}}
        }),
    );

    let rendered = run(
        &mut planner,
        json!({
            "operation": "events",
            "selection": {
                "title": null,
                "participants": {"user": {"username": null}, "event": {"title": null}}
            }
        }),
    );
    assert_eq!(
        rendered,
        json!([{
            "title": "Retro",
            "participants": [{"user": {"username": "bo"}, "event": {"title": "Retro"}}]
        }])
    );

    let rendered = run(
        &mut planner,
        json!({
            "operation": "users",
            "selection": {"username": null, "events": {"title": null}}
        }),
    );
    assert_eq!(
        rendered,
        json!([
            {"username": "ana", "events": [{"title": "Retro"}]},
            {"username": "bo", "events": []}
        ])
    );
}

#[test]
fn relation_without_nested_selection_renders_scalars() {
    let mut planner = planner();
    let user = run(
        &mut planner,
        json!({"operation": "createUser", "arguments": {"data": {"username": "ana", "email": "a@x.io"}}}),
    );
    let participant = run(
        &mut planner,
        json!({
            "operation": "createParticipant",
            "arguments": {"data": {"user_id": id_of(&user), "event_id": "e-gone"}}
        }),
    );
    let rendered = run(
        &mut planner,
        json!({
            "operation": "participant",
            "arguments": {"id": id_of(&participant)},
            "selection": {"user": null, "event": null}
        }),
    );
    assert_eq!(
        rendered,
        json!({"user": {"id": id_of(&user), "username": "ana", "email": "a@x.io"}, "event": null})
    );
}

#[test]
fn update_through_operation_surface_merges() {
    let mut planner = planner();
    let location = run(
        &mut planner,
        json!({
            "operation": "createLocation",
            "arguments": {"data": {"name": "Hall", "desc": "Ground floor", "lat": 1.0, "lng": 2.0}}
        }),
    );
    let updated = run(
        &mut planner,
        json!({
            "operation": "updateLocation",
            "arguments": {"id": id_of(&location), "data": {"lat": 5.5, "desc": null}}
        }),
    );
    assert_eq!(
        updated,
        json!({"id": id_of(&location), "name": "Hall", "desc": "Ground floor", "lat": 5.5, "lng": 2.0})
    );
}

#[test]
fn failed_operations_report_kind_and_id() {
    let mut planner = planner();
    planner.create::<User>(serde_json::from_value(json!({"username": "ana", "email": "a@x.io"})).unwrap());

    for operation in ["user", "deleteUser"].iter() {
        let request = Request::new(*operation).argument("id", json!("missing"));
        match execute(&mut planner, &request) {
            Err(QueryError::Graph(Error::NotFound { kind, id })) => {
                assert_eq!(kind.name(), "User");
                assert_eq!(id, "missing");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    let request = Request::new("updateUser")
        .argument("id", json!("missing"))
        .argument("data", json!({"username": "x"}))
        .select(Selection::new().field("id"));
    assert!(matches!(
        execute(&mut planner, &request),
        Err(QueryError::Graph(Error::NotFound { .. }))
    ));
    assert_eq!(planner.list::<User>().len(), 1);
    assert_eq!(planner.list::<User>()[0].username, "ana");
}

#[test]
fn seeded_store_serves_queries() {
    let store = Store::from_seed(
        r#"{
            "users": [{"id": "u1", "username": "ana", "email": "a@x.io"}],
            "events": [{"id": "e1", "title": "Launch", "location_id": "l1", "user_id": "u1"}]
        }"#
        .as_bytes(),
    )
    .unwrap();
    let mut planner = Planner::with_ids(store, SequentialIds::new("new"));
    let rendered = run(
        &mut planner,
        json!({"operation": "user", "arguments": {"id": "u1"}, "selection": {"events": {"id": null}}}),
    );
    assert_eq!(rendered, json!({"events": [{"id": "e1"}]}));

    let created = run(
        &mut planner,
        json!({"operation": "createLocation", "arguments": {"data": {"name": "Hall", "lat": 0, "lng": 0}}}),
    );
    assert_eq!(created["id"], "new-1");
    let rendered = run(
        &mut planner,
        json!({"operation": "event", "arguments": {"id": "e1"}, "selection": {"location": {"name": null}}}),
    );
    assert_eq!(rendered, json!({"location": null}));
}
