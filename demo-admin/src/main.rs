//! Minimal admin server: mounts the passkey routes plus one session-protected
//! sample endpoint, the way the real check-in backend consumes the crates.

use axum::{Json, Router, middleware::from_fn, routing::get};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use checkin_passkey_axum::{ADMIN_ROUTE_PREFIX, admin_passkey_router, require_admin_session};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("demo_admin=debug,checkin_passkey=debug,info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// Stand-in for the record-review endpoint of the real backend; anything
// mounted behind require_admin_session needs a live session token.
async fn list_records() -> Json<serde_json::Value> {
    Json(json!({ "records": [] }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    dotenvy::dotenv().ok();
    checkin_passkey_axum::init().await?;

    let admin_routes = admin_passkey_router().route(
        "/records",
        get(list_records).route_layer(from_fn(require_admin_session)),
    );

    let app = Router::new().nest(ADMIN_ROUTE_PREFIX.as_str(), admin_routes);

    println!("Starting server on http://localhost:3001");
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
    axum::serve(listener, app).await?;
    Ok(())
}
