mod config;
mod handlers;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use config::Config;
use handlers::AppState;
use portainer_proxy_services::PortainerService;
use std::sync::Arc;

/// Any origin, method and header, with credentials. Development-grade.
fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_method()
        .allow_any_origin()
        .allow_any_header()
        .supports_credentials()
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    log::info!("Portainer URL: {}", config.portainer.url);
    log::info!("Portainer Username: {}", config.portainer.username);
    log::info!("Endpoint ID: {}", config.portainer.endpoint_id);

    let portainer = Arc::new(PortainerService::new(config.portainer.clone())?);
    let app_state = web::Data::new(AppState { portainer });
    let static_dir = config.static_dir.clone();

    log::info!(
        "Starting Portainer proxy on {}:{} (static files from {})",
        config.server_host,
        config.server_port,
        static_dir
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors_policy())
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
            .configure(|cfg| routes::frontend(cfg, &static_dir))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
