// handlers/crud.rs - behaviour shared by every entity collection
//
// Each entity module parses its own request bodies and applies its own
// field updates; listing, lookup, creation and deletion are identical and
// live here.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::{Deserialize, Deserializer};

use crate::api::{query_pairs, ListResponse, PageLinks, Pagination};
use crate::config::AppConfig;
use crate::database::models::Entity;
use crate::database::{Repository, Tracked};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult};

/// Parse a path id, rejecting anything that is not an integer with 400.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid id '{}': expected an integer", raw)))
}

/// Unwrap a JSON body, turning axum's rejection into our 400.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = payload?;
    Ok(value)
}

/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`) in partial update bodies.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn param<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

fn collection_url(config: &AppConfig, path: &str) -> String {
    format!("{}{}", config.api.public_url.trim_end_matches('/'), path)
}

/// GET collection: validate the query, then fetch one page and its links.
///
/// Sort, order and filters are checked before the repository is touched,
/// so a bad request never reaches the store.
pub async fn list<E: Entity>(
    repo: &Repository<E>,
    config: &AppConfig,
    path: &str,
    raw_query: Option<&str>,
) -> ApiResult<ListResponse<E>> {
    let pairs = query_pairs(raw_query);
    let page = Pagination::resolve(param(&pairs, "limit"), param(&pairs, "offset"));
    let filter = Filter::from_query(
        E::FIELDS,
        E::SORTS,
        E::ID_COLUMN,
        param(&pairs, "filters"),
        param(&pairs, "sort"),
        param(&pairs, "order"),
    )?;

    let result = repo.find_all(filter, page).await;
    let links = PageLinks::build(result.total, page, &collection_url(config, path), &pairs);
    Ok(ApiResponse::success(ListResponse::new(result.items, result.total, page, links)))
}

pub async fn show<E: Entity>(repo: &Repository<E>, raw_id: &str) -> ApiResult<E> {
    let id = parse_id(raw_id)?;
    repo.find_by_id(id)
        .await
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("{} {} not found", E::KIND, id)))
}

pub async fn create<E: Entity>(repo: &Repository<E>, config: &AppConfig, path: &str, entity: E) -> ApiResult<E> {
    let stored = repo.create(entity).await?;
    let location = match stored.id() {
        Some(id) => format!("{}/{}", collection_url(config, path), id),
        None => collection_url(config, path),
    };
    Ok(ApiResponse::created(stored, location))
}

/// PUT: load, apply the caller's field updates, save only if something
/// actually changed.
pub async fn update<E, F>(repo: &Repository<E>, raw_id: &str, apply: F) -> ApiResult<E>
where
    E: Entity,
    F: FnOnce(&mut Tracked<E>),
{
    let id = parse_id(raw_id)?;
    let mut record = repo
        .load(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("{} {} not found", E::KIND, id)))?;
    apply(&mut record);
    repo.save(&mut record).await?;
    Ok(ApiResponse::success(record.into_inner()))
}

pub async fn delete<E: Entity>(repo: &Repository<E>, raw_id: &str) -> ApiResult<()> {
    let id = parse_id(raw_id)?;
    if repo.delete_by_id(id).await? {
        Ok(ApiResponse::<()>::no_content())
    } else {
        Err(ApiError::not_found(format!("{} {} not found", E::KIND, id)))
    }
}
