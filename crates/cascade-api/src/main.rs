use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cascade_agent::Agent;
use cascade_api::config::Config;
use cascade_api::handlers::{health, sessions, stream};
use cascade_api::state::AppState;
use cascade_api::StreamingApi;
use cascade_llm::OpenAIChatClient;
use cascade_store::{FileStore, SessionStore};
use cascade_tools::ToolRegistry;
use cascade_types::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Cascade API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let mut client = OpenAIChatClient::new(config.openai_api_key.clone())?;
    if let Some(base_url) = &config.llm.base_url {
        client = client.with_base_url(base_url);
    }

    let store = SessionStore::new(FileStore::new(&config.storage.dir)?);
    tracing::info!(dir = %config.storage.dir, "storage initialized");

    let mut agent_config = AgentConfig::new()
        .with_model(&config.llm.model)
        .with_max_iterations(config.agent.max_iterations);
    if let Some(delay_ms) = config.agent.step_delay_ms {
        agent_config = agent_config.with_step_delay(Duration::from_millis(delay_ms));
    }

    let agent = Agent::new(
        Arc::new(client),
        Arc::new(ToolRegistry::with_math_tools()),
        store,
        agent_config,
    );

    let state = AppState::new(config.clone(), StreamingApi::new(agent));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/questions", post(stream::ask_question_stream))
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/:session_id", get(sessions::get_session))
        // 5 min for streaming
        .layer(TimeoutLayer::new(Duration::from_secs(300)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
