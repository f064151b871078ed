use portainer_proxy_services::PortainerCredentials;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub portainer: PortainerCredentials,
    pub server_host: String,
    pub server_port: u16,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                log::warn!("{} is not set; Portainer calls will fail", key);
                String::new()
            })
        };

        let portainer = PortainerCredentials {
            url: required("PORTAINER_URL").trim_end_matches('/').to_string(),
            username: required("PORTAINER_USERNAME"),
            password: required("PORTAINER_PASSWORD"),
            endpoint_id: required("ENDPOINT_ID"),
        };

        Self {
            portainer,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: lookup("SERVER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "./static".to_string()),
        }
    }
}
