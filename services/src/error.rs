use thiserror::Error;

/// Failures talking to Portainer.
#[derive(Debug, Error)]
pub enum PortainerError {
    /// `/api/auth` was unreachable, answered non-200, or returned no token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The forwarded call reached Portainer but did not succeed.
    #[error("Portainer returned status {status}")]
    Upstream { status: u16 },

    #[error("Request to Portainer failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode Portainer response: {0}")]
    Decode(String),

    /// Rejected before any call is made.
    #[error("Invalid container id: {0:?}")]
    InvalidContainerId(String),

    #[error("Invalid Portainer URL: {0}")]
    InvalidUrl(String),
}

impl PortainerError {
    /// Upstream status to forward to the caller, if there is one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            PortainerError::Upstream { status } => Some(*status),
            _ => None,
        }
    }
}
