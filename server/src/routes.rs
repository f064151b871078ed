use crate::handlers;
use actix_files::{Files, NamedFile};
use actix_web::dev::{ServiceRequest, ServiceResponse, fn_service};
use actix_web::web;
use std::path::{Path, PathBuf};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Auth endpoint
        .route("/api/auth", web::post().to(handlers::authenticate))

        // Container endpoints
        .route("/api/containers", web::get().to(handlers::list_containers))
        .route(
            "/api/start/{container_id}",
            web::post().to(handlers::start_container),
        )
        .route(
            "/api/stop/{container_id}",
            web::post().to(handlers::stop_container),
        )
        .route(
            "/api/pause/{container_id}",
            web::post().to(handlers::pause_container),
        )
        .route(
            "/api/resume/{container_id}",
            web::post().to(handlers::resume_container),
        )
        .route(
            "/api/restart/{container_id}",
            web::post().to(handlers::restart_container),
        );
}

/// Serve the frontend bundle from `static_dir`. Must be registered after the API routes.
///
/// Paths without a matching file get `index.html` so client-side routes
/// survive a reload; `/api/...` paths never fall back.
pub fn frontend(cfg: &mut web::ServiceConfig, static_dir: &str) {
    if !Path::new(static_dir).is_dir() {
        log::warn!("Static directory {} not found; frontend will not be served", static_dir);
        cfg.default_service(web::to(handlers::not_found));
        return;
    }

    let index = PathBuf::from(static_dir).join("index.html");

    cfg.service(
        Files::new("/", static_dir)
            .index_file("index.html")
            .default_handler(fn_service(move |req: ServiceRequest| {
                let index = index.clone();
                async move {
                    let (req, _) = req.into_parts();
                    if req.path().starts_with("/api/") {
                        let res = handlers::not_found().await;
                        return Ok(ServiceResponse::new(req, res));
                    }

                    let res = match NamedFile::open_async(&index).await {
                        Ok(file) => file.into_response(&req),
                        Err(_) => handlers::not_found().await,
                    };
                    Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
                }
            })),
    );
}
