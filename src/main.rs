mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{header::CONTENT_TYPE, Method};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::{db::db::DBClient, service::stripe::StripeClient};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub stripe: Arc<StripeClient>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let stripe = Arc::new(StripeClient::new(&config));

        Self {
            env: config,
            db_client: Arc::new(db_client),
            stripe,
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
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    // Webhook and scheduler endpoints only; no browser clients, so CORS can
    // stay permissive on methods it actually serves.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state.clone()).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);

    // Start the in-process digest scheduler
    let app_state_clone = app_state.clone();
    tokio::spawn(async move {
        service::background_jobs::start_digest_job(app_state_clone).await;
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
