pub mod error;
pub mod portainer_service;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::PortainerError;
pub use portainer_service::{PortainerCredentials, PortainerService};
