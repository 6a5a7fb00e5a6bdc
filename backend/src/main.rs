use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use octlens::build_pipeline;
use octlens::config::AppConfig;
use octlens::routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let pipeline = build_pipeline(&config);
    if config.model.preload {
        match pipeline.holder().get() {
            Ok(_) => log::info!("Model preloaded from {}", config.model.path.display()),
            // Keep serving; the next prediction retries the load.
            Err(e) => log::error!("Failed to preload model at startup ({}): {}", e.kind(), e),
        }
    }

    let pipeline = web::Data::new(pipeline);
    let upload_limits = web::Data::new(config.upload.clone());
    let frontend_dir = config.server.frontend_dir.clone();
    let bind_address = config.bind_address();

    log::info!("Serving frontend from {}", frontend_dir.display());
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .wrap(actix_web::middleware::Logger::default())
            .app_data(pipeline.clone())
            .app_data(upload_limits.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
