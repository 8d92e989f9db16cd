use anyhow::Result;
use std::sync::Arc;
use tower::ServiceBuilder;

use dramabox_gateway::{
    auth::TokenStore,
    config::Config,
    http_client::DramaBoxClient,
    middleware,
    routes::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    init_logging(&config);

    tracing::info!("🚀 DramaBox Gateway starting...");
    tracing::info!(
        "Server configured: {}:{}",
        config.server_host,
        config.server_port
    );

    // Initialize token store
    tracing::info!(
        "Initializing token store with {} source(s)...",
        config.token_sources.len()
    );
    let token_store = Arc::new(TokenStore::new(
        config.token_sources.clone(),
        config.token_ttl,
        config.token_fetch_timeout,
    )?);

    // Warm the cache so the first request does not pay for the fetch
    match token_store.get_credential().await {
        Ok(credential) => {
            let preview: String = credential.token.chars().take(12).collect();
            tracing::info!("✅ Token acquired (token: {}...)", preview);
        }
        Err(e) => {
            tracing::error!("❌ Token acquisition failed: {}", e);
            tracing::warn!("Server will start but API requests will fail until a token source responds");
        }
    }

    // Initialize HTTP client
    let client = Arc::new(DramaBoxClient::new(
        token_store.clone(),
        config.api_base_url.clone(),
        config.http_connect_timeout,
        config.http_request_timeout,
        config.http_max_retries,
    )?);
    tracing::info!("✅ HTTP client initialized");

    let app_state = AppState {
        token_store,
        client,
        config: Arc::new(config.clone()),
    };

    let app = build_app(app_state);

    // Bind to configured host and port
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    print_startup_banner(&config);

    // Start server with graceful shutdown
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server shutdown complete");

    Ok(())
}

/// Initialize logging with the configured level; RUST_LOG takes precedence
fn init_logging(config: &Config) {
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Build the application with all routes and middleware
fn build_app(state: AppState) -> axum::Router {
    // Outermost first: CORS answers preflights before logging sees them
    routes::router(state).layer(
        ServiceBuilder::new()
            .layer(middleware::cors_layer())
            .layer(axum::middleware::from_fn(middleware::request_logger)),
    )
}

/// Print startup banner
fn print_startup_banner(config: &Config) {
    let banner = r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║               🎬 DramaBox Gateway - Rust Edition          ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner);
    println!("  Version:       {}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Server:        http://{}:{}",
        config.server_host, config.server_port
    );
    println!("  Upstream:      {}", config.api_base_url);
    println!("  Token sources: {}", config.token_sources.len());
    println!("  Token TTL:     {}s", config.token_ttl.as_secs());
    println!("  Max retries:   {}", config.http_max_retries);
    println!("  Log Level:     {}", config.log_level);
    println!();
    println!("  Endpoints:");
    println!("    GET /api/latest");
    println!("    GET /api/search");
    println!("    GET /api/stream/:bookId");
    println!("    GET /api/health");
    println!();
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
