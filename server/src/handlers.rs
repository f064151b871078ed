use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use portainer_proxy_services::{PortainerError, PortainerService};
use portainer_proxy_shared::{ContainerAction, ContainerActionResponse};
use std::sync::Arc;

pub struct AppState {
    pub portainer: Arc<PortainerService>,
}

/// Map a Portainer failure onto the response sent to our client.
///
/// Upstream statuses are forwarded with `failure_message`, a bad container id
/// is a 400, everything else is a 500.
fn portainer_error_response(err: &PortainerError, failure_message: &str) -> HttpResponse {
    match err {
        PortainerError::Authentication(_) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Authentication failed"
            }))
        }
        PortainerError::Upstream { status } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(serde_json::json!({
                "error": failure_message
            }))
        }
        PortainerError::InvalidContainerId(_) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": err.to_string()
            }))
        }
        PortainerError::Network(_) | PortainerError::Decode(_) | PortainerError::InvalidUrl(_) => {
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": err.to_string()
            }))
        }
    }
}

/// Fetch a fresh Portainer token
pub async fn authenticate(state: web::Data<AppState>) -> impl Responder {
    match state.portainer.authenticate().await {
        Ok(token) => HttpResponse::Ok().json(token),
        Err(e) => {
            log::error!("Portainer authentication failed: {}", e);
            portainer_error_response(&e, "Authentication failed")
        }
    }
}

/// List containers on the configured endpoint
pub async fn list_containers(state: web::Data<AppState>) -> impl Responder {
    match state.portainer.list_containers().await {
        Ok(containers) => HttpResponse::Ok().json(containers),
        Err(e) => {
            log::error!("Failed to fetch containers: {}", e);
            portainer_error_response(&e, "Failed to fetch containers")
        }
    }
}

async fn dispatch_action(
    state: &AppState,
    action: ContainerAction,
    container_id: String,
) -> HttpResponse {
    match state.portainer.container_action(&container_id, action).await {
        Ok(()) => {
            log::info!("Container {} {}", container_id, action.past_tense());
            HttpResponse::Ok().json(ContainerActionResponse::new(action, container_id))
        }
        Err(e) => {
            log::error!("Failed to {} container {}: {}", action.verb(), container_id, e);
            portainer_error_response(&e, &format!("Failed to {} container", action.verb()))
        }
    }
}

pub async fn start_container(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    dispatch_action(&state, ContainerAction::Start, path.into_inner()).await
}

pub async fn stop_container(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    dispatch_action(&state, ContainerAction::Stop, path.into_inner()).await
}

pub async fn pause_container(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    dispatch_action(&state, ContainerAction::Pause, path.into_inner()).await
}

/// Resume a paused container (Docker calls this `unpause`)
pub async fn resume_container(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    dispatch_action(&state, ContainerAction::Resume, path.into_inner()).await
}

pub async fn restart_container(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    dispatch_action(&state, ContainerAction::Restart, path.into_inner()).await
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Not found"
    }))
}
