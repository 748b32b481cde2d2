// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app_router(app_state: AppState) -> Router {
    // Login é público; /me exige o token
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route(
            "/me",
            get(handlers::auth::get_me).route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        );

    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::crm::list_clients).post(handlers::crm::create_client),
        )
        .route(
            "/{id}",
            get(handlers::crm::get_client)
                .put(handlers::crm::update_client)
                .delete(handlers::crm::delete_client),
        );

    let material_routes = Router::new()
        .route(
            "/",
            get(handlers::inventory::list_materials).post(handlers::inventory::create_material),
        )
        .route("/low-stock", get(handlers::inventory::list_low_stock))
        .route(
            "/{id}",
            get(handlers::inventory::get_material)
                .put(handlers::inventory::update_material)
                .delete(handlers::inventory::delete_material),
        )
        .route("/{id}/stock", put(handlers::inventory::update_stock))
        .route("/{id}/adjust", post(handlers::inventory::adjust_stock));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/{id}/composition", get(handlers::products::get_composition));

    let quote_routes = Router::new()
        .route(
            "/",
            get(handlers::quotes::list_quotes).post(handlers::quotes::create_quote),
        )
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/approval", get(handlers::quotes::start_approval))
        .route("/{id}/approve", post(handlers::quotes::approve_quote))
        .route("/{id}/pay", post(handlers::quotes::mark_paid))
        .route("/{id}/cancel", post(handlers::quotes::cancel_quote));

    // Tudo abaixo exige o token
    let protected = Router::new()
        .nest("/clients", client_routes)
        .nest("/materials", material_routes)
        .nest("/products", product_routes)
        .nest("/quotes", quote_routes)
        .route("/dashboard", get(handlers::dashboard::get_metrics))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state)
}
