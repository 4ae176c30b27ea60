use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::info;

mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod traits;
mod utils;

use config::MarketConfig;
use services::MarketService;
use traits::{Clock, SystemClock};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Get environment variables with defaults
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("SERVER_PORT must be a number");
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(log_level));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let market_config = MarketConfig::load(clock.now()).expect("Failed to load market configuration");

    let market = web::Data::new(
        MarketService::new(&market_config, clock).expect("Failed to initialize market"),
    );

    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        // Configure CORS middleware
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec!["content-type", "content-length", "accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(market.clone())
            .configure(routes::configure)
            .route(
                "/health",
                web::get().to(|| async {
                    info!("Health check");
                    HttpResponse::Ok().body("OK")
                }),
            )
    })
    .bind(format!("{host}:{port}"))?
    .run()
    .await?;

    info!("Server shutting down");
    Ok(())
}
