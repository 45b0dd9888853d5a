//! In-memory stand-in for the arguments API, used by the client's
//! end-to-end tests.
//!
//! Every save starts at version 1 and every update appends a new version.
//! Errors are plain-text bodies, successes are `{ "argument": ... }` or
//! `{ "arguments": [...] }` envelopes.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub id: i64,
    pub version: u32,
    pub conclusion: String,
    pub premises: Vec<String>,
}

#[derive(Deserialize)]
pub struct NewArgument {
    pub conclusion: String,
    pub premises: Vec<String>,
}

#[derive(Deserialize)]
pub struct ArgumentPatch {
    pub conclusion: Option<String>,
    pub premises: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OneArgument {
    pub argument: Argument,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SomeArguments {
    pub arguments: Vec<Argument>,
}

/// Query parameters of `GET /arguments`.
#[derive(Debug, Default, Deserialize)]
pub struct FetchSome {
    pub conclusion: Option<String>,
    pub search: Option<String>,
    pub count: Option<usize>,
    pub offset: Option<usize>,
    pub exclude: Option<String>,
}

/// All versions of every argument, keyed by ID. Index 0 of each history is
/// version 1.
#[derive(Debug, Default)]
pub struct ArgumentStore {
    last_id: i64,
    arguments: BTreeMap<i64, Vec<Argument>>,
    unavailable: bool,
}

impl ArgumentStore {
    pub fn save(&mut self, input: NewArgument) -> Argument {
        self.last_id += 1;
        let argument = Argument {
            id: self.last_id,
            version: 1,
            conclusion: input.conclusion,
            premises: input.premises,
        };
        self.arguments.insert(argument.id, vec![argument.clone()]);
        argument
    }

    pub fn live(&self, id: i64) -> Option<&Argument> {
        self.arguments.get(&id).and_then(|versions| versions.last())
    }

    pub fn version(&self, id: i64, version: u32) -> Option<&Argument> {
        let index = usize::try_from(version).ok()?.checked_sub(1)?;
        self.arguments.get(&id).and_then(|versions| versions.get(index))
    }

    /// Append `next` as the newest version of its argument.
    fn push_version(&mut self, mut next: Argument) -> Option<Argument> {
        let versions = self.arguments.get_mut(&next.id)?;
        next.version = versions.len() as u32 + 1;
        versions.push(next.clone());
        Some(next)
    }

    pub fn delete(&mut self, id: i64) -> bool {
        self.arguments.remove(&id).is_some()
    }

    /// Live versions matching the filter, in ID order.
    pub fn fetch_some(&self, filter: &FetchSome, exclude: &[i64]) -> Vec<Argument> {
        let words: Vec<&str> = filter
            .search
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default();
        let matching = self
            .arguments
            .iter()
            .filter(|(id, _)| !exclude.contains(id))
            .filter_map(|(_, versions)| versions.last())
            .filter(|arg| filter.conclusion.as_deref().map_or(true, |c| c == arg.conclusion))
            .filter(|arg| words.iter().all(|w| arg.conclusion.contains(w)))
            .skip(filter.offset.unwrap_or(0))
            .cloned();
        match filter.count {
            Some(count) if count > 0 => matching.take(count).collect(),
            _ => matching.collect(),
        }
    }

    /// While set, every request fails with 503.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }
}

pub type Db = Arc<RwLock<ArgumentStore>>;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

pub fn app() -> Router {
    app_with(Db::default())
}

/// Router over a store the caller keeps a handle to.
pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/arguments", get(get_some).post(save))
        .route("/arguments/{id}", get(get_live).patch(update).delete(delete))
        .route("/arguments/{id}/version/{version}", get(get_version))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

fn location(argument: &Argument) -> String {
    format!("/arguments/{}/version/{}", argument.id, argument.version)
}

fn parse_id(raw: &str) -> HandlerResult<i64> {
    raw.parse()
        .map_err(|_| (StatusCode::NOT_FOUND, format!("argument {raw} does not exist")))
}

fn missing(id: i64) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("argument {id} does not exist"))
}

fn check_available(store: &ArgumentStore) -> HandlerResult<()> {
    if store.unavailable {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "store unavailable".to_string()));
    }
    Ok(())
}

fn validate(conclusion: &str, premises: &[String]) -> HandlerResult<()> {
    let bad = |msg: String| Err((StatusCode::BAD_REQUEST, msg));
    if conclusion.is_empty() {
        return bad("arguments must have a conclusion".to_string());
    }
    if premises.len() < 2 {
        return bad("arguments must have at least 2 premises".to_string());
    }
    if let Some(i) = premises.iter().position(String::is_empty) {
        return bad(format!("argument premise[{i}] is empty, but must not be"));
    }
    Ok(())
}

async fn get_some(State(db): State<Db>, Query(filter): Query<FetchSome>) -> HandlerResult<Json<SomeArguments>> {
    let store = db.read().await;
    check_available(&store)?;
    let exclude = match filter.exclude.as_deref() {
        None | Some("") => Vec::new(),
        Some(raw) => raw
            .split(',')
            .map(|id| id.trim().parse::<i64>())
            .collect::<Result<_, _>>()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("invalid exclude list: {raw}")))?,
    };
    Ok(Json(SomeArguments {
        arguments: store.fetch_some(&filter, &exclude),
    }))
}

async fn save(State(db): State<Db>, Json(input): Json<NewArgument>) -> HandlerResult<impl IntoResponse> {
    let mut store = db.write().await;
    check_available(&store)?;
    validate(&input.conclusion, &input.premises)?;
    let argument = store.save(input);
    debug!(id = argument.id, "saved argument");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location(&argument))],
        Json(OneArgument { argument }),
    ))
}

async fn get_live(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<Json<OneArgument>> {
    let store = db.read().await;
    check_available(&store)?;
    let id = parse_id(&id)?;
    let argument = store.live(id).cloned().ok_or_else(|| missing(id))?;
    Ok(Json(OneArgument { argument }))
}

async fn get_version(
    State(db): State<Db>,
    Path((id, version)): Path<(String, String)>,
) -> HandlerResult<Json<OneArgument>> {
    let store = db.read().await;
    check_available(&store)?;
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            format!("version {version} of argument {id} does not exist"),
        )
    };
    let parsed_id: i64 = id.parse().map_err(|_| not_found())?;
    let parsed_version: u32 = version.parse().map_err(|_| not_found())?;
    let argument = store
        .version(parsed_id, parsed_version)
        .cloned()
        .ok_or_else(not_found)?;
    Ok(Json(OneArgument { argument }))
}

async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(patch): Json<ArgumentPatch>,
) -> HandlerResult<impl IntoResponse> {
    let mut store = db.write().await;
    check_available(&store)?;
    let id = parse_id(&id)?;
    let mut next = store.live(id).cloned().ok_or_else(|| missing(id))?;
    if let Some(conclusion) = patch.conclusion {
        next.conclusion = conclusion;
    }
    if let Some(premises) = patch.premises {
        next.premises = premises;
    }
    validate(&next.conclusion, &next.premises)?;
    let argument = store.push_version(next).ok_or_else(|| missing(id))?;
    debug!(id, version = argument.version, "updated argument");
    Ok((
        StatusCode::OK,
        [(header::LOCATION, location(&argument))],
        Json(OneArgument { argument }),
    ))
}

async fn delete(State(db): State<Db>, Path(id): Path<String>) -> HandlerResult<StatusCode> {
    let mut store = db.write().await;
    check_available(&store)?;
    let id = parse_id(&id)?;
    if store.delete(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(missing(id))
    }
}
