//! Read-only film and actor endpoints.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use reel_core::validation::validate_search_query;
use reel_core::{Actor, ActorStats, Film, RankedFilm};

use super::{path_id, Envelope};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `GET /api/films/{id}` data.
#[derive(Debug, Serialize)]
pub struct FilmDetails {
    pub film: Film,
    pub actors: Vec<Actor>,
}

/// `GET /api/actors/{id}` data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDetails {
    pub actor: ActorStats,
    pub top_films: Vec<RankedFilm>,
}

#[derive(Debug, Deserialize)]
pub struct FilmSearchParams {
    pub q: Option<String>,
}

pub async fn list_films(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<Film>>>> {
    let films = state.catalog().list_films().await?;
    Ok(Envelope::ok(films))
}

pub async fn top_rented_films(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<RankedFilm>>>> {
    let films = state.catalog().top_rented_films().await?;
    Ok(Envelope::ok(films))
}

/// `GET /api/films/search?q=`: title substring, at most 20 rows.
pub async fn search_films(
    State(state): State<AppState>,
    Query(params): Query<FilmSearchParams>,
) -> ApiResult<Json<Envelope<Vec<Film>>>> {
    let query = validate_search_query(params.q.as_deref().unwrap_or_default())?;
    let films = state.catalog().search_films(&query).await?;
    Ok(Envelope::ok(films))
}

pub async fn film_details(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<FilmDetails>>> {
    let film_id = path_id("film_id", path)?;
    let catalog = state.catalog();

    let film = catalog
        .film_details(film_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Film {} not found", film_id)))?;
    let actors = catalog.film_actors(film_id).await?;

    Ok(Envelope::ok(FilmDetails { film, actors }))
}

pub async fn top_actors(
    State(state): State<AppState>,
) -> ApiResult<Json<Envelope<Vec<ActorStats>>>> {
    let actors = state.catalog().top_actors().await?;
    Ok(Envelope::ok(actors))
}

pub async fn actor_details(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<ActorDetails>>> {
    let actor_id = path_id("actor_id", path)?;
    let catalog = state.catalog();

    let actor = catalog
        .actor_details(actor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Actor {} not found", actor_id)))?;
    let top_films = catalog.actor_top_films(actor_id).await?;

    Ok(Envelope::ok(ActorDetails { actor, top_films }))
}
