use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Container as listed by the Docker API behind Portainer.
///
/// Field names are kept in Docker's casing so the list endpoint hands the
/// upstream shape straight through to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    pub names: Vec<String>,
    pub image: String,
    pub state: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Map<String, Value>>,
}

/// Lifecycle operations that can be forwarded to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Pause,
    Resume,
    Restart,
}

impl ContainerAction {
    pub const ALL: [ContainerAction; 5] = [
        ContainerAction::Start,
        ContainerAction::Stop,
        ContainerAction::Pause,
        ContainerAction::Resume,
        ContainerAction::Restart,
    ];

    /// Path segment of the Docker endpoint, e.g. `/containers/{id}/unpause`.
    pub fn docker_path(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Pause => "pause",
            ContainerAction::Resume => "unpause",
            ContainerAction::Restart => "restart",
        }
    }

    /// Imperative verb, as used in the public route and in error messages.
    pub fn verb(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Pause => "pause",
            ContainerAction::Resume => "resume",
            ContainerAction::Restart => "restart",
        }
    }

    /// Label reported back once the action succeeded.
    pub fn past_tense(&self) -> &'static str {
        match self {
            ContainerAction::Start => "started",
            ContainerAction::Stop => "stopped",
            ContainerAction::Pause => "paused",
            ContainerAction::Resume => "resumed",
            ContainerAction::Restart => "restarted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerActionResponse {
    pub status: String,
    pub container_id: String,
}

impl ContainerActionResponse {
    pub fn new(action: ContainerAction, container_id: impl Into<String>) -> Self {
        Self {
            status: action.past_tense().to_string(),
            container_id: container_id.into(),
        }
    }
}
