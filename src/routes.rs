use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        agencies::agencies_handler,
        auth::auth_handler,
        clients::clients_handler,
        files::files_handler,
        notifications::notifications_handler,
        properties::properties_handler,
        submissions::{submissions_client_handler, submissions_staff_handler},
        users::users_handler,
    },
    middleware::{auth, client_auth},
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/agencies",
            agencies_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/clients",
            clients_handler().layer(middleware::from_fn(client_auth)),
        )
        .nest(
            "/properties",
            properties_handler().layer(middleware::from_fn(client_auth)),
        )
        .nest(
            "/client/submissions",
            submissions_client_handler().layer(middleware::from_fn(client_auth)),
        )
        .nest(
            "/submissions",
            submissions_staff_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/notifications",
            notifications_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/files", files_handler())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
