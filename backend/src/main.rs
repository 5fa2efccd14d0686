use std::net::SocketAddr;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use health_tracker_backend::domain::commands::users::CreateUserCommand;
use health_tracker_backend::domain::models::user::Role;
use health_tracker_backend::rest::build_router;
use health_tracker_backend::Backend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up backend services");
    let backend = Backend::new();

    // The in-memory store starts empty; seed a bootstrap admin so the API
    // is reachable in development.
    let admin = backend.user_service.create_user(CreateUserCommand {
        username: "admin".to_string(),
        password: "admin".to_string(),
        role: Role::Admin,
        institution_id: None,
    })?;
    info!("Seeded bootstrap admin with id {}", admin.id);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let app = build_router(backend).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
