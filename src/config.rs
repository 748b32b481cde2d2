// src/config.rs

use std::{env, sync::Arc};

use crate::{
    common::error::AppError,
    db::{
        ClientRepository, MaterialRepository, ProductRepository, QuoteRepository, RecordStore,
        SqliteStore,
    },
    services::{
        seed::seed_demo_data, AuthService, CrmService, DashboardService, InventoryService,
        ProductService, QuoteService, ReferencePolicy, StockLock,
    },
};

// Configurações lidas do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub demo_email: String,
    pub demo_password: String,
    pub authorized_companies: Vec<String>,
    pub reference_policy: ReferencePolicy,
    pub seed_demo_data: bool,
    pub bcrypt_cost: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;

        let reference_policy = match env::var("MISSING_REFERENCE_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => ReferencePolicy::default(),
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value.parse()?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://orcasystem.db?mode=rwc"),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            jwt_secret,
            demo_email: var_or("DEMO_EMAIL", "teste@gmail.com"),
            demo_password: var_or("DEMO_PASSWORD", "12345678"),
            authorized_companies: var_or("DEMO_COMPANY", "nrdev")
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            reference_policy,
            seed_demo_data: matches!(
                var_or("SEED_DEMO_DATA", "false").to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            bcrypt_cost,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub crm_service: CrmService,
    pub inventory_service: InventoryService,
    pub product_service: ProductService,
    pub quote_service: QuoteService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Abre o SQLite, roda as migrações e (opcionalmente) o seed.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let sqlite = SqliteStore::connect(&settings.database_url).await?;
        sqlite.migrate().await?;

        let store: Arc<dyn RecordStore> = Arc::new(sqlite);
        if settings.seed_demo_data {
            seed_demo_data(store.clone()).await?;
        }

        Self::with_store(store, settings).await
    }

    // --- Monta o gráfico de dependências ---
    pub async fn with_store(store: Arc<dyn RecordStore>, settings: &Settings) -> Result<Self, AppError> {
        let client_repo = ClientRepository::new(store.clone());
        let material_repo = MaterialRepository::new(store.clone());
        let product_repo = ProductRepository::new(store.clone());
        let quote_repo = QuoteRepository::new(store);
        let stock_lock = StockLock::default();

        let auth_service = AuthService::new(
            settings.demo_email.clone(),
            settings.demo_password.clone(),
            settings.authorized_companies.clone(),
            settings.jwt_secret.clone(),
            settings.bcrypt_cost,
        )
        .await?;

        tracing::info!(
            "⚙️ Política para referências ausentes: {}",
            settings.reference_policy
        );

        Ok(Self {
            crm_service: CrmService::new(client_repo.clone(), quote_repo.clone()),
            inventory_service: InventoryService::new(
                material_repo.clone(),
                product_repo.clone(),
                stock_lock.clone(),
            ),
            product_service: ProductService::new(
                product_repo.clone(),
                material_repo.clone(),
                quote_repo.clone(),
            ),
            quote_service: QuoteService::new(
                quote_repo.clone(),
                product_repo.clone(),
                material_repo.clone(),
                client_repo,
                settings.reference_policy,
                stock_lock,
            ),
            dashboard_service: DashboardService::new(quote_repo, product_repo, material_repo),
            auth_service,
        })
    }
}
