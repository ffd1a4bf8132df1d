use campus_gateway::app::{AppState, build_router};
use campus_gateway::config::db::{GeminiConfig, HttpClientConfig, SupabaseConfig};
use campus_gateway::config::environment::AppConfig;
use campus_gateway::infra::init_infra;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            std::process::exit(1);
        }
    };

    let infra = match (
        SupabaseConfig::from_app(&config),
        GeminiConfig::from_app(&config),
    ) {
        (Ok(supabase), Ok(gemini)) => {
            match init_infra(&supabase, &gemini, &HttpClientConfig::from_app(&config)) {
                Ok(i) => i,
                Err(e) => {
                    error!(error = %e, "infra init failed");
                    std::process::exit(1);
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "external services not configured");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    info!(
        env = %config.rust_env,
        host = %config.api_host,
        port = config.api_port,
        service = %config.service_name,
        "campus-gateway started"
    );

    let state = AppState::new(config, infra);
    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
