use axum::{
    routing::{get, post},
    Router,
};
use questgen_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let taxonomy_api = Router::new()
        .route("/api/taxonomy/exams", get(routes::taxonomy::list_exams))
        .route("/api/taxonomy/courses", get(routes::taxonomy::list_courses))
        .route(
            "/api/taxonomy/subjects",
            get(routes::taxonomy::list_subjects),
        )
        .route("/api/taxonomy/units", get(routes::taxonomy::list_units))
        .route(
            "/api/taxonomy/chapters",
            get(routes::taxonomy::list_chapters),
        )
        .route("/api/taxonomy/topics", get(routes::taxonomy::list_topics))
        .route("/api/taxonomy/parts", get(routes::taxonomy::list_parts))
        .route("/api/taxonomy/slots", get(routes::taxonomy::list_slots));

    let generation_api = Router::new()
        .route(
            "/api/questions/generate",
            post(routes::generation::generate_questions),
        )
        .layer(axum::middleware::from_fn(
            questgen_backend::middleware::auth::require_bearer_auth,
        ));

    let app = base_routes
        .merge(taxonomy_api)
        .merge(generation_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
