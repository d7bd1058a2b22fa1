mod assistant;
mod config;
mod context;
mod routes;
mod vision;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{InferenceConfig, ServiceConfig};
use context::AppContext;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServiceConfig::from_env();
    let settings = InferenceConfig::load_or_default(&config.inference_config_path);
    let context = web::Data::new(AppContext::load(&config, &settings));
    if !context.pipeline.is_ready() || !context.assistant.is_ready() {
        log::warn!("Starting in degraded mode, affected endpoints will report errors");
    }

    let frontend_dir = config.frontend_dir.clone().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!("Frontend directory {} not found, serving the API only", dir.display());
        }
        exists
    });

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(context.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await
}
