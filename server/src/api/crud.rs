//! Handlers shared by every catalog resource.
//!
//! Each handler is instantiated once per resource type by the route table.
//! Path ids and request bodies are checked here, before anything reaches
//! the store.

use crate::error::{CatalogError, TIMED_OUT};
use crate::models::{Draft, Resource};
use crate::store::{Catalog, Repository};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;

/// Parse a `{id}` path segment. Ids are positive base-10 integers.
pub fn parse_id(raw: &str, label: &str) -> Result<i32, CatalogError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CatalogError::Validation(format!(
            "{} ID must be a positive integer",
            label
        ))),
    }
}

/// Run a store call on the blocking pool.
///
/// Once started, a store call is bounded by the database itself (pool
/// checkout and `statement_timeout`), and a cancelled statement leaves
/// nothing behind. A call still queued after `queue_timeout` is dropped
/// unstarted. Either way the response matches what was stored. The outer
/// timeout only fires if a store ignores its own limits.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, CatalogError>
where
    T: Send + 'static,
    F: FnOnce(Arc<dyn Catalog>) -> Result<T, CatalogError> + Send + 'static,
{
    let catalog = Arc::clone(&state.catalog);
    let queue_timeout = state.queue_timeout;
    let queued = Instant::now();

    let task = tokio::task::spawn_blocking(move || {
        let waited = queued.elapsed();
        if waited >= queue_timeout {
            return Err(CatalogError::storage(
                TIMED_OUT,
                format!("waited {:?} for a worker, not started", waited),
            ));
        }
        op(catalog)
    });

    match tokio::time::timeout(state.db_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(CatalogError::storage("Database task failed", e)),
        Err(_) => Err(CatalogError::storage(
            TIMED_OUT,
            format!("no response within {:?}", state.db_timeout),
        )),
    }
}

pub async fn create<R>(
    State(state): State<AppState>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), CatalogError>
where
    R: Resource,
    dyn Catalog: Repository<R>,
{
    let Json(draft) = payload?;
    draft.validate()?;

    let record = run_blocking(&state, move |catalog| {
        <dyn Catalog as Repository<R>>::create(&*catalog, draft)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list<R>(State(state): State<AppState>) -> Result<Json<Vec<R>>, CatalogError>
where
    R: Resource,
    dyn Catalog: Repository<R>,
{
    let records = run_blocking(&state, |catalog| {
        <dyn Catalog as Repository<R>>::list(&*catalog)
    })
    .await?;

    Ok(Json(records))
}

pub async fn get<R>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<R>, CatalogError>
where
    R: Resource,
    dyn Catalog: Repository<R>,
{
    let id = parse_id(&raw_id, R::LABEL)?;

    let record = run_blocking(&state, move |catalog| {
        <dyn Catalog as Repository<R>>::get(&*catalog, id)
    })
    .await?;

    Ok(Json(record))
}

/// Full replacement. Responds with the stored row.
pub async fn update<R>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<Json<R>, CatalogError>
where
    R: Resource,
    dyn Catalog: Repository<R>,
{
    let id = parse_id(&raw_id, R::LABEL)?;
    let Json(draft) = payload?;
    draft.validate()?;

    let record = run_blocking(&state, move |catalog| {
        <dyn Catalog as Repository<R>>::update(&*catalog, id, draft)
    })
    .await?;

    Ok(Json(record))
}

pub async fn delete<R>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, CatalogError>
where
    R: Resource,
    dyn Catalog: Repository<R>,
{
    let id = parse_id(&raw_id, R::LABEL)?;

    run_blocking(&state, move |catalog| {
        <dyn Catalog as Repository<R>>::delete(&*catalog, id)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
