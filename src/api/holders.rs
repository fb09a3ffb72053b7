//! Holder endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::holder::{CreateHolder, Holder, HolderId, UpdateHolder},
    AppState,
};

/// List all holders
#[utoipa::path(
    get,
    path = "/holders/",
    tag = "holders",
    responses(
        (status = 200, description = "All holders with the books they hold", body = Vec<Holder>)
    )
)]
pub async fn list_holders(State(state): State<AppState>) -> AppResult<Json<Vec<Holder>>> {
    let holders = state.services.holders.list().await?;
    Ok(Json(holders))
}

/// Get holder by ID
#[utoipa::path(
    get,
    path = "/holders/{id}/",
    tag = "holders",
    params(("id" = i32, Path, description = "Holder ID")),
    responses(
        (status = 200, description = "Holder details", body = Holder),
        (status = 404, description = "Holder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_holder(
    State(state): State<AppState>,
    Path(id): Path<HolderId>,
) -> AppResult<Json<Holder>> {
    let holder = state.services.holders.get_by_id(id).await?;
    Ok(Json(holder))
}

/// Create a holder
#[utoipa::path(
    post,
    path = "/holders/",
    tag = "holders",
    request_body = CreateHolder,
    responses(
        (status = 201, description = "Holder created", body = Holder),
        (status = 409, description = "Name already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_holder(
    State(state): State<AppState>,
    Json(data): Json<CreateHolder>,
) -> AppResult<(StatusCode, Json<Holder>)> {
    let holder = state.services.holders.create(data).await?;
    Ok((StatusCode::CREATED, Json(holder)))
}

/// Rename a holder
#[utoipa::path(
    put,
    path = "/holders/{id}/",
    tag = "holders",
    params(("id" = i32, Path, description = "Holder ID")),
    request_body = UpdateHolder,
    responses(
        (status = 200, description = "Holder updated", body = Holder),
        (status = 404, description = "Holder not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_holder(
    State(state): State<AppState>,
    Path(id): Path<HolderId>,
    Json(data): Json<UpdateHolder>,
) -> AppResult<Json<Holder>> {
    let holder = state.services.holders.update(id, data).await?;
    Ok(Json(holder))
}

/// Delete a holder and the books it holds
#[utoipa::path(
    delete,
    path = "/holders/{id}/",
    tag = "holders",
    params(("id" = i32, Path, description = "Holder ID")),
    responses(
        (status = 204, description = "Holder deleted"),
        (status = 404, description = "Holder not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_holder(
    State(state): State<AppState>,
    Path(id): Path<HolderId>,
) -> AppResult<StatusCode> {
    state.services.holders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
