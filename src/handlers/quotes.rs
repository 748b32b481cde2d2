// src/handlers/quotes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::quotes::{
        ApprovalDraft, ApprovalPayload, CancelPayload, Quote, QuoteFilter, QuoteInput,
        QuoteSummary,
    },
};

// GET /api/quotes?status=&search=
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Orçamentos",
    params(
        ("status" = Option<String>, Query, description = "orcamento | em_andamento | pago | cancelado"),
        ("search" = Option<String>, Query, description = "Código, nome do cliente ou validade (dd/mm/aaaa)")
    ),
    responses(
        (status = 200, description = "Lista de orçamentos", body = Vec<QuoteSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<QuoteFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = app_state
        .quote_service
        .list_quotes(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quotes))
}

#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento", body = Quote),
        (status = 404, description = "Orçamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .get_quote(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Orçamentos",
    request_body = QuoteInput,
    responses(
        (status = 201, description = "Orçamento criado", body = Quote),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<QuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .create_quote(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(quote)))
}

#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Orçamentos",
    request_body = QuoteInput,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento atualizado", body = Quote),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 409, description = "Orçamento não está em aberto")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .update_quote(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

// GET /api/quotes/{id}/approval
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/approval",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Rascunho de aprovação (nada marcado)", body = ApprovalDraft),
        (status = 409, description = "Orçamento não pode ser aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_approval(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = app_state
        .quote_service
        .start_approval(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(draft))
}

// POST /api/quotes/{id}/approve
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/approve",
    tag = "Orçamentos",
    request_body = ApprovalPayload,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento aprovado e estoque baixado", body = Quote),
        (status = 400, description = "Nenhum item selecionado ou quantidade inválida"),
        (status = 409, description = "Orçamento não pode ser aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .approve_quote(id, payload.items)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/pay",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento pago", body = Quote),
        (status = 409, description = "Orçamento não está em andamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .mark_paid(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/cancel",
    tag = "Orçamentos",
    request_body = CancelPayload,
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento cancelado", body = Quote),
        (status = 400, description = "Motivo ausente"),
        (status = 409, description = "Orçamento já finalizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .cancel_quote(id, &payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(quote))
}

#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 204, description = "Orçamento excluído"),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 409, description = "Orçamentos pagos não podem ser excluídos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quote_service
        .delete_quote(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
