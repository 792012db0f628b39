//! Meetupcal application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Connect to Redis
//! 3. Resolve the bot username (cached in Redis, getMe on first run)
//! 4. Start the notification dispatch worker
//! 5. Build router with API routes and CORS for the Mini App origin
//! 6. Start Axum server with graceful shutdown

use meetupcal::{
    auth::middleware::AppState, config::Config, dispatch::Dispatcher, routes, storage,
    telegram::TelegramClient,
};
use axum::http::{header, HeaderValue, Method};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config from environment
    let config = Config::from_env().expect("Failed to load config");
    tracing::info!("Starting meetupcal on {}", config.bind_addr);

    // Connect to Redis
    let redis_client = redis::Client::open(config.redis_url.as_str()).expect("Invalid Redis URL");

    // Verify Redis connection
    let mut con = redis_client
        .get_multiplexed_async_connection()
        .await
        .expect("Failed to connect to Redis");

    let telegram = TelegramClient::new(config.bot_token.clone(), config.use_test_api);

    // The bot username goes into t.me deep links; resolve it once and
    // cache it so restarts don't depend on the Telegram API being up
    let bot_name = match storage::settings::get_setting(&mut con, "bot_name")
        .await
        .expect("Failed to read bot name setting")
    {
        Some(name) => name,
        None => {
            let me = telegram.get_me().await.expect("getMe failed");
            if !me.ok {
                panic!("getMe returned ok=false");
            }
            let name = me
                .result
                .and_then(|p| p.username)
                .expect("getMe returned no username");
            storage::settings::set_setting(&mut con, "bot_name", &name)
                .await
                .expect("Failed to cache bot name");
            name
        }
    };
    tracing::info!("Bot username '{}' configured", bot_name);

    // Start the outbound message worker
    let (dispatcher, dispatch_handle) = Dispatcher::spawn(telegram.clone(), bot_name.clone());

    // Build shared state
    let state = AppState {
        redis: redis_client,
        config: Arc::new(config.clone()),
        telegram,
        dispatcher: dispatcher.clone(),
        bot_name,
    };

    // Only the Mini App origin may make cross-origin requests; tokens
    // travel in the Authorization header, never in cookies
    let frontend_origin = config
        .frontend_url
        .parse::<HeaderValue>()
        .expect("Invalid FRONTEND_URL");
    let cors = CorsLayer::new()
        .allow_origin(frontend_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86_400));

    let app = routes::api_router().layer(cors).with_state(state);

    // Bind to configured address
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .expect("Server error");

    // Let the worker drain queued notifications before exiting
    drop(dispatcher);
    let _ = dispatch_handle.await;
}
