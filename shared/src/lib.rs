pub mod models;

pub use models::{ContainerAction, ContainerActionResponse, ContainerSummary};
