// region:    --- Imports
use super::{ensure_admin_or_owner, ensure_path_id, OwnerQuery};
use crate::catalog::{Collectable, Collection, Publication};
use crate::error::MarketError;
use crate::query::{self, CollectableFilter, PublicationFilter};
use crate::session::{Admin, MaybeSession};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// region:    --- Collections
pub async fn handle_list_collections(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let collections =
        query::handlers::list_collections(&state.collections(), search.q.as_deref()).await?;
    Ok(Json(collections))
}

pub async fn handle_get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.collections().find(&id).await?.record))
}

pub async fn handle_create_collection(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(collection): Json<Collection>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> create collection: {}", "Handler", collection.name);
    collection.validate()?;
    let created = state.collections().create(collection).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_replace_collection(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
    Json(collection): Json<Collection>,
) -> Result<impl IntoResponse, MarketError> {
    ensure_path_id(&id, &collection.id)?;
    collection.validate()?;
    state.collections().find(&id).await?;
    Ok(Json(state.collections().replace(&id, collection).await?))
}

pub async fn handle_delete_collection(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> delete collection: {}", "Handler", id);
    state.collections().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Collections

// region:    --- Collectables
pub async fn handle_list_collectables(
    State(state): State<AppState>,
    Query(filter): Query<CollectableFilter>,
) -> Result<impl IntoResponse, MarketError> {
    let collectables = query::handlers::list_collectables(&state.collectables(), &filter).await?;
    Ok(Json(collectables))
}

pub async fn handle_get_collectable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.collectables().find(&id).await?.record))
}

/// The referenced collection, when given, has to exist.
async fn ensure_collection(state: &AppState, collectable: &Collectable) -> Result<(), MarketError> {
    if let Some(collection_id) = collectable.collection_id.as_deref() {
        if !state.collections().exists(collection_id).await? {
            return Err(MarketError::NotFound {
                kind: "collection",
                id: collection_id.to_string(),
            });
        }
    }
    Ok(())
}

pub async fn handle_create_collectable(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(collectable): Json<Collectable>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> create collectable: {}", "Handler", collectable.name);
    collectable.validate()?;
    ensure_collection(&state, &collectable).await?;
    let created = state.collectables().create(collectable).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_replace_collectable(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
    Json(collectable): Json<Collectable>,
) -> Result<impl IntoResponse, MarketError> {
    ensure_path_id(&id, &collectable.id)?;
    collectable.validate()?;
    ensure_collection(&state, &collectable).await?;
    state.collectables().find(&id).await?;
    Ok(Json(state.collectables().replace(&id, collectable).await?))
}

pub async fn handle_delete_collectable(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> delete collectable: {}", "Handler", id);
    state.collectables().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Collectables

// region:    --- Publications
pub async fn handle_list_publications(
    State(state): State<AppState>,
    Query(filter): Query<PublicationFilter>,
) -> Result<impl IntoResponse, MarketError> {
    let publications = query::handlers::list_publications(&state.publications(), &filter).await?;
    Ok(Json(publications))
}

pub async fn handle_get_publication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.publications().find(&id).await?.record))
}

pub async fn handle_create_publication(
    State(state): State<AppState>,
    Json(publication): Json<Publication>,
) -> Result<impl IntoResponse, MarketError> {
    info!(
        "{:<12} --> create publication: {} by {}",
        "Handler", publication.name, publication.user_id
    );
    publication.validate()?;
    if !state.users().exists(&publication.user_id).await? {
        return Err(MarketError::NotFound {
            kind: "user",
            id: publication.user_id,
        });
    }
    let created = state.publications().create(publication).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_replace_publication(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
    Json(mut publication): Json<Publication>,
) -> Result<impl IntoResponse, MarketError> {
    ensure_path_id(&id, &publication.id)?;
    publication.validate()?;
    let stored = state.publications().find(&id).await?.record;
    ensure_admin_or_owner(&session, &owner, &stored.user_id)?;
    if publication.user_id != stored.user_id {
        return Err(MarketError::invalid_record(
            "a publication cannot change owner",
        ));
    }
    publication.created_at = stored.created_at;
    Ok(Json(state.publications().replace(&id, publication).await?))
}

pub async fn handle_delete_publication(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> delete publication: {}", "Handler", id);
    let stored = state.publications().find(&id).await?.record;
    ensure_admin_or_owner(&session, &owner, &stored.user_id)?;
    state.publications().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Publications
