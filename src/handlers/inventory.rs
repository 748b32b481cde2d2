// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::inventory::{Material, MaterialInput, StockUpdatePayload},
    services::inventory_service::StockChange,
};

// Entrada/saída avulsa de estoque (positivo soma, negativo baixa até zero)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockDeltaPayload {
    #[schema(example = -2.5)]
    pub delta: Decimal,
}

#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Estoque",
    responses(
        (status = 200, description = "Lista de itens de estoque", body = Vec<Material>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let materials = app_state
        .inventory_service
        .list_materials()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(materials))
}

// GET /api/materials/low-stock
#[utoipa::path(
    get,
    path = "/api/materials/low-stock",
    tag = "Estoque",
    responses(
        (status = 200, description = "Itens no estoque mínimo ou abaixo", body = Vec<Material>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let materials = app_state
        .inventory_service
        .list_low_stock()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(materials))
}

#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    tag = "Estoque",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item de estoque", body = Material),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_material(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .inventory_service
        .get_material(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(material))
}

#[utoipa::path(
    post,
    path = "/api/materials",
    tag = "Estoque",
    request_body = MaterialInput,
    responses(
        (status = 201, description = "Item cadastrado", body = Material),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<MaterialInput>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .inventory_service
        .create_material(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(material)))
}

#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    tag = "Estoque",
    request_body = MaterialInput,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item atualizado", body = Material),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialInput>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .inventory_service
        .update_material(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(material))
}

// PUT /api/materials/{id}/stock
#[utoipa::path(
    put,
    path = "/api/materials/{id}/stock",
    tag = "Estoque",
    request_body = StockUpdatePayload,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Estoque ajustado", body = Material),
        (status = 400, description = "Valor negativo"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockUpdatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let material = app_state
        .inventory_service
        .update_stock(id, payload.stock)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(material))
}

// POST /api/materials/{id}/adjust
#[utoipa::path(
    post,
    path = "/api/materials/{id}/adjust",
    tag = "Estoque",
    request_body = StockDeltaPayload,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Movimentação aplicada", body = StockChange),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockDeltaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let change = app_state
        .inventory_service
        .apply_delta(id, payload.delta)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(change))
}

#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    tag = "Estoque",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item excluído"),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Item usado em composições")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_material(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inventory_service
        .delete_material(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
