//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use orcasystem::{app_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;

    let app_state = AppState::new(&settings)
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao inicializar o estado da aplicação: {e}"))?;

    let app = app_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
