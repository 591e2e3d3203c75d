mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use service::{
    audit_service::AuditService, messaging_service::MessagingService,
    notification_service::NotificationService, sms_service::SmsService,
    storage_service::StorageService, submission_service::SubmissionService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub storage_service: Arc<StorageService>,
    pub sms_service: Arc<SmsService>,
    pub audit_service: Arc<AuditService>,
    pub notification_service: Arc<NotificationService>,
    pub submission_service: Arc<SubmissionService>,
    pub messaging_service: Arc<MessagingService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let storage_service = Arc::new(StorageService::new(
            config.storage_root.clone(),
            config.max_upload_bytes,
            config.jwt_secret.clone(),
            config.app_url.clone(),
            config.signed_url_ttl_secs,
        ));
        let sms_service = Arc::new(SmsService::new(
            config.sms_api_url.clone(),
            config.sms_api_key.clone(),
        ));
        let audit_service = AuditService::new(db_client_arc.clone());
        let notification_service = NotificationService::new(db_client_arc.clone());

        let submission_service = Arc::new(SubmissionService::new(
            db_client_arc.clone(),
            audit_service.clone(),
            notification_service.clone(),
        ));
        let messaging_service = Arc::new(MessagingService::new(
            db_client_arc.clone(),
            storage_service.clone(),
            audit_service.clone(),
            notification_service.clone(),
        ));

        AppState {
            env: config,
            db_client: db_client_arc,
            storage_service,
            sms_service,
            audit_service: Arc::new(audit_service),
            notification_service: Arc::new(notification_service),
            submission_service,
            messaging_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .app_url
                .parse::<HeaderValue>()
                .expect("APP_URL must be a valid origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let port = config.port;
    let db_client = DBClient::new(pool);
    let app_state = Arc::new(AppState::new(db_client, config));

    let app = create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind server port");

    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
