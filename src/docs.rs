// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Clientes ---
        handlers::crm::list_clients,
        handlers::crm::get_client,
        handlers::crm::create_client,
        handlers::crm::update_client,
        handlers::crm::delete_client,

        // --- Estoque ---
        handlers::inventory::list_materials,
        handlers::inventory::list_low_stock,
        handlers::inventory::get_material,
        handlers::inventory::create_material,
        handlers::inventory::update_material,
        handlers::inventory::update_stock,
        handlers::inventory::adjust_stock,
        handlers::inventory::delete_material,

        // --- Produtos ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::get_composition,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Orçamentos ---
        handlers::quotes::list_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::create_quote,
        handlers::quotes::update_quote,
        handlers::quotes::start_approval,
        handlers::quotes::approve_quote,
        handlers::quotes::mark_paid,
        handlers::quotes::cancel_quote,
        handlers::quotes::delete_quote,

        // --- Dashboard ---
        handlers::dashboard::get_metrics,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::SessionUser,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Clientes ---
            models::crm::Client,
            models::crm::ClientInput,

            // --- Estoque / Produtos ---
            models::inventory::Material,
            models::inventory::MaterialInput,
            models::inventory::CompositionEntry,
            models::inventory::Product,
            models::inventory::ProductInput,
            models::inventory::ResolvedComponent,
            models::inventory::StockUpdatePayload,
            handlers::inventory::StockDeltaPayload,
            services::inventory_service::StockChange,

            // --- Orçamentos ---
            models::quotes::QuoteStatus,
            models::quotes::QuoteItem,
            models::quotes::Quote,
            models::quotes::QuoteItemInput,
            models::quotes::QuoteInput,
            models::quotes::ApprovalDraft,
            models::quotes::ApprovalLine,
            models::quotes::ApprovalDecision,
            models::quotes::ApprovalPayload,
            models::quotes::CancelPayload,
            models::quotes::QuoteSummary,

            // --- Dashboard ---
            models::dashboard::DashboardMetrics,
            models::dashboard::BestSellerEntry,
            models::dashboard::LowStockEntry,
            models::dashboard::SaleEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Login de demonstração"),
        (name = "Clientes", description = "Cadastro de clientes"),
        (name = "Estoque", description = "Itens, materiais e ajustes de estoque"),
        (name = "Produtos", description = "Produtos e ficha técnica (composição)"),
        (name = "Orçamentos", description = "Ciclo de vida do orçamento e aprovação parcial"),
        (name = "Dashboard", description = "Indicadores gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
