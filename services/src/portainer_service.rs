use crate::error::PortainerError;
use anyhow::{Context, Result};
use portainer_proxy_shared::{ContainerAction, ContainerSummary};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

/// Connection settings for the Portainer instance being proxied.
#[derive(Clone, Default)]
pub struct PortainerCredentials {
    pub url: String,
    pub username: String,
    pub password: String,
    pub endpoint_id: String,
}

impl std::fmt::Debug for PortainerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortainerCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint_id", &self.endpoint_id)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    jwt: String,
}

/// Relays container operations to Portainer's Docker proxy.
///
/// Every call authenticates first; tokens are never reused between calls.
pub struct PortainerService {
    client: Client,
    credentials: PortainerCredentials,
}

impl PortainerService {
    pub fn new(credentials: PortainerCredentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client for Portainer")?;

        Ok(Self { client, credentials })
    }

    pub fn credentials(&self) -> &PortainerCredentials {
        &self.credentials
    }

    fn containers_url(&self) -> String {
        format!(
            "{}/api/endpoints/{}/docker/containers",
            self.credentials.url, self.credentials.endpoint_id
        )
    }

    /// Exchange the configured username and password for a JWT.
    pub async fn authenticate(&self) -> Result<String, PortainerError> {
        let auth_url = format!("{}/api/auth", self.credentials.url);
        log::debug!("Authenticating to: {}", auth_url);

        let response = self
            .client
            .post(&auth_url)
            .json(&AuthRequest {
                username: &self.credentials.username,
                password: &self.credentials.password,
            })
            .send()
            .await
            .map_err(|e| {
                log::error!("Portainer auth request failed: {}", e);
                PortainerError::Authentication(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Portainer rejected authentication with status {}", status);
            return Err(PortainerError::Authentication(format!(
                "Portainer answered {}",
                status.as_u16()
            )));
        }

        let auth: AuthResponse = response.json().await.map_err(|e| {
            PortainerError::Authentication(format!("invalid token response: {}", e))
        })?;

        Ok(auth.jwt)
    }

    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>, PortainerError> {
        let token = self.authenticate().await?;
        let url = format!("{}/json", self.containers_url());
        log::debug!("Listing containers: GET {}", url);

        let response = self.client.get(&url).bearer_auth(&token).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Portainer container list answered {}", status);
            return Err(PortainerError::Upstream {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<ContainerSummary>>()
            .await
            .map_err(|e| PortainerError::Decode(e.to_string()))
    }

    /// `{containers}/{id}/{action}`, with the id encoded as exactly one path segment.
    fn action_url(
        &self,
        container_id: &str,
        action: ContainerAction,
    ) -> Result<Url, PortainerError> {
        if container_id.is_empty() || container_id == "." || container_id == ".." {
            return Err(PortainerError::InvalidContainerId(container_id.to_string()));
        }

        let mut url = Url::parse(&self.containers_url())
            .map_err(|e| PortainerError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PortainerError::InvalidUrl(self.credentials.url.clone()))?
            .push(container_id)
            .push(action.docker_path());

        Ok(url)
    }

    /// Forward a lifecycle action. Docker signals success with 204.
    pub async fn container_action(
        &self,
        container_id: &str,
        action: ContainerAction,
    ) -> Result<(), PortainerError> {
        let url = self.action_url(container_id, action)?;
        let token = self.authenticate().await?;
        log::debug!("Forwarding {}: POST {}", action.verb(), url);

        let response = self.client.post(url).bearer_auth(&token).send().await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            log::warn!(
                "Portainer refused to {} container {}: {}",
                action.verb(),
                container_id,
                status
            );
            return Err(PortainerError::Upstream {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MOCK_JWT, MockBehaviour, MockPortainer};
    use serde_json::json;

    fn service_for(url: &str) -> PortainerService {
        PortainerService::new(PortainerCredentials {
            url: url.to_string(),
            username: "admin".to_string(),
            password: "s3cret".to_string(),
            endpoint_id: "2".to_string(),
        })
        .unwrap()
    }

    /// A loopback address nobody is listening on.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[actix_web::test]
    async fn authenticate_posts_credentials() {
        let mock = MockPortainer::start(MockBehaviour::default()).await.unwrap();
        let service = service_for(mock.url());

        let token = service.authenticate().await.unwrap();
        assert_eq!(token, MOCK_JWT);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].path, "/api/auth");
        let body: serde_json::Value = serde_json::from_str(&calls[0].body).unwrap();
        assert_eq!(body, json!({"Username": "admin", "Password": "s3cret"}));
    }

    #[actix_web::test]
    async fn authenticate_rejects_non_200() {
        let mock = MockPortainer::start(MockBehaviour {
            auth_status: 422,
            ..Default::default()
        })
        .await
        .unwrap();

        let err = service_for(mock.url()).authenticate().await.unwrap_err();
        assert!(matches!(err, PortainerError::Authentication(_)));
        assert_eq!(err.upstream_status(), None);
    }

    #[actix_web::test]
    async fn unreachable_portainer_is_an_auth_failure() {
        let err = service_for(&closed_port_url())
            .container_action("abc", ContainerAction::Start)
            .await
            .unwrap_err();
        assert!(matches!(err, PortainerError::Authentication(_)));
    }

    #[actix_web::test]
    async fn empty_url_fails_without_panicking() {
        let err = service_for("").list_containers().await.unwrap_err();
        assert!(matches!(err, PortainerError::Authentication(_)));
    }

    #[actix_web::test]
    async fn list_keeps_upstream_order() {
        let mock = MockPortainer::start(MockBehaviour {
            list_body: json!([
                {"Id": "b", "Names": ["/second"], "Image": "redis", "State": "running", "Status": "Up"},
                {"Id": "a", "Names": ["/first"], "Image": "nginx", "State": "paused", "Status": "Up (Paused)"}
            ]),
            ..Default::default()
        })
        .await
        .unwrap();

        let containers = service_for(mock.url()).list_containers().await.unwrap();
        let ids: Vec<_> = containers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);

        let forwarded = mock.forwarded_calls();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].method, "GET");
        assert_eq!(forwarded[0].path, "/api/endpoints/2/docker/containers/json");
        assert_eq!(
            forwarded[0].authorization.as_deref(),
            Some(format!("Bearer {}", MOCK_JWT).as_str())
        );
    }

    #[actix_web::test]
    async fn list_reports_upstream_status() {
        let mock = MockPortainer::start(MockBehaviour {
            list_status: 403,
            ..Default::default()
        })
        .await
        .unwrap();

        let err = service_for(mock.url()).list_containers().await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(403));
    }

    #[actix_web::test]
    async fn list_reports_malformed_body() {
        let mock = MockPortainer::start(MockBehaviour {
            list_body: json!({"message": "not a list"}),
            ..Default::default()
        })
        .await
        .unwrap();

        let err = service_for(mock.url()).list_containers().await.unwrap_err();
        assert!(matches!(err, PortainerError::Decode(_)));
    }

    #[actix_web::test]
    async fn action_hits_docker_path() {
        let mock = MockPortainer::start(MockBehaviour::default()).await.unwrap();
        let service = service_for(mock.url());

        service
            .container_action("f00d", ContainerAction::Resume)
            .await
            .unwrap();

        let forwarded = mock.forwarded_calls();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].method, "POST");
        assert_eq!(
            forwarded[0].path,
            "/api/endpoints/2/docker/containers/f00d/unpause"
        );
        assert!(forwarded[0].body.is_empty());
    }

    #[actix_web::test]
    async fn action_treats_200_as_failure() {
        let mock = MockPortainer::start(MockBehaviour {
            action_status: 200,
            ..Default::default()
        })
        .await
        .unwrap();

        let err = service_for(mock.url())
            .container_action("abc", ContainerAction::Stop)
            .await
            .unwrap_err();
        assert_eq!(err.upstream_status(), Some(200));
    }

    #[test]
    fn container_id_is_one_encoded_segment() {
        let service = service_for("http://portainer.local:9000");

        let cases = [
            ("abc?x", "abc%3Fx"),
            ("abc#frag", "abc%23frag"),
            ("a/../../json", "a%2F..%2F..%2Fjson"),
            ("50%off", "50%25off"),
        ];
        for (id, encoded) in cases {
            let url = service.action_url(id, ContainerAction::Stop).unwrap();
            assert_eq!(
                url.as_str(),
                format!("http://portainer.local:9000/api/endpoints/2/docker/containers/{}/stop", encoded)
            );
        }
    }

    #[actix_web::test]
    async fn dot_segments_are_rejected_before_any_call() {
        let mock = MockPortainer::start(MockBehaviour::default()).await.unwrap();
        let service = service_for(mock.url());

        for id in ["", ".", ".."] {
            let err = service
                .container_action(id, ContainerAction::Stop)
                .await
                .unwrap_err();
            assert!(matches!(err, PortainerError::InvalidContainerId(_)), "{:?}", id);
        }
        assert!(mock.calls().is_empty());
    }

    #[actix_web::test]
    async fn forwarded_transport_failure_is_a_network_error() {
        let mock = MockPortainer::start(MockBehaviour {
            forwards_unreachable: true,
            ..Default::default()
        })
        .await
        .unwrap();
        let service = service_for(mock.url());

        let err = service.list_containers().await.unwrap_err();
        assert!(matches!(err, PortainerError::Network(_)), "{:?}", err);

        let err = service
            .container_action("abc", ContainerAction::Pause)
            .await
            .unwrap_err();
        assert!(matches!(err, PortainerError::Network(_)), "{:?}", err);
    }

    #[test]
    fn debug_output_hides_password() {
        let credentials = PortainerCredentials {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
