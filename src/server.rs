use crate::error::Error as GraphError;
use crate::planner::Planner;
use crate::query::{self, QueryError, Request};
use crate::schema::EntityKind;

use bytes::Bytes;
use futures::prelude::*;
use gotham::handler::{HandlerFuture, HandlerResult};
use gotham::helpers::http::response::create_response;
use gotham::middleware::state::StateMiddleware;
use gotham::pipeline::{single_middleware, single_pipeline};
use gotham::router::builder::*;
use gotham::router::Router;
use gotham::state::{FromState, State};
use gotham_derive::{StateData, StaticResponseExtender};
use hyper::{Body, Response, StatusCode};
use serde_derive::Deserialize;
use serde_json::{json, Value};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// The planner shared by every request.
#[derive(Clone, StateData)]
pub struct Graph {
    inner: Arc<Mutex<Planner>>,
}

impl Graph {
    pub fn new(planner: Planner) -> Self {
        Graph {
            inner: Arc::new(Mutex::new(planner)),
        }
    }

    /// Locks the planner for one whole operation. Operations never leave the
    /// store half-changed, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Planner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn execute(&self, request: &Request) -> Result<Value, QueryError> {
        let mut planner = self.lock();
        query::execute(&mut *planner, request)
    }
}

pub fn router(graph: Graph) -> Router {
    let (chain, pipelines) = single_pipeline(single_middleware(StateMiddleware::new(graph)));
    build_router(chain, pipelines, |route| {
        route.post("/query").to(run_query);
        route
            .get("/:collection")
            .with_path_extractor::<CollectionPath>()
            .to(list_collection);
        route
            .get("/:collection/:id")
            .with_path_extractor::<RowPath>()
            .to(get_row);
    })
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
struct CollectionPath {
    collection: String,
}

#[derive(Deserialize, StateData, StaticResponseExtender)]
struct RowPath {
    collection: String,
    id: String,
}

#[derive(Debug)]
enum Error {
    UnknownCollection(String),
    Query(QueryError),
    Inner(hyper::Error),
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl Error {
    fn as_response(&self, state: &State) -> Response<Body> {
        let mut body = json!({
            "message": self.to_string(),
            "kind": self.kind(),
        });
        if let Error::Query(QueryError::Graph(GraphError::NotFound { kind, id })) = self {
            body["entity"] = json!(kind.name());
            body["id"] = json!(id);
        }
        create_response(
            state,
            self.status_code(),
            mime::APPLICATION_JSON,
            json!({ "error": body }).to_string(),
        )
    }

    fn status_code(&self) -> StatusCode {
        use Error::*;
        match self {
            UnknownCollection(..) | Query(QueryError::Graph(GraphError::NotFound { .. })) => {
                StatusCode::NOT_FOUND
            }
            Query(..) => StatusCode::BAD_REQUEST,
            Inner(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        use Error::*;
        match self {
            UnknownCollection(..) | Query(QueryError::Graph(GraphError::NotFound { .. })) => {
                "NotFound"
            }
            Query(..) => "BadRequest",
            Inner(..) => "Internal",
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        use Error::*;
        match self {
            UnknownCollection(collection) => write!(f, "Unknown collection: {}", collection),
            Query(err) => write!(f, "{}", err),
            Inner(..) => write!(f, "Unexpected error"),
        }
    }
}

fn respond(state: &State, result: Result<Value, Error>) -> Response<Body> {
    match result {
        Ok(data) => create_response(
            state,
            StatusCode::OK,
            mime::APPLICATION_JSON,
            json!({ "data": data }).to_string(),
        ),
        Err(err) => {
            warn!(error = %err, "request failed");
            err.as_response(state)
        }
    }
}

fn run_query(mut state: State) -> Pin<Box<HandlerFuture>> {
    let graph = Graph::borrow_from(&state).clone();
    let f = hyper::body::to_bytes(Body::take_from(&mut state)).map(move |body| -> HandlerResult {
        let result = match body {
            Ok(body) => run_query_inner(&graph, body),
            Err(err) => Err(Error::Inner(err)),
        };
        let response = respond(&state, result);
        Ok((state, response))
    });
    f.boxed()
}

fn run_query_inner(graph: &Graph, body: Bytes) -> Result<Value, Error> {
    let request = Request::from_slice(&body)?;
    info!(operation = %request.operation, "running operation");
    Ok(graph.execute(&request)?)
}

fn collection_kind(collection: &str) -> Result<EntityKind, Error> {
    EntityKind::from_collection(collection)
        .ok_or_else(|| Error::UnknownCollection(collection.to_owned()))
}

fn list_collection(state: State) -> (State, Response<Body>) {
    let path = CollectionPath::borrow_from(&state);
    let result = collection_kind(&path.collection).and_then(|kind| {
        let graph = Graph::borrow_from(&state);
        Ok(graph.execute(&Request::new(kind.collection()))?)
    });
    let response = respond(&state, result);
    (state, response)
}

fn get_row(state: State) -> (State, Response<Body>) {
    let path = RowPath::borrow_from(&state);
    let result = collection_kind(&path.collection).and_then(|kind| {
        let graph = Graph::borrow_from(&state);
        let request = Request::new(kind.singular()).argument("id", json!(path.id));
        Ok(graph.execute(&request)?)
    });
    let response = respond(&state, result);
    (state, response)
}
