// --- Gestión de investigación - Archivo principal ---

use investiga::config::Config;
use investiga::run_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::desde_entorno();
    tracing::info!("=== Gestión de investigación (API) ===");
    tracing::info!("Iniciando servidor en http://{}", config.bind);
    run_server(config).await
}
