//! Client for the external bridge provisioning service.

use serde::Serialize;
use tracing::{info, warn};

use crate::common::error::ProvisionError;
use crate::common::types::{PlumbRequest, ProvisionOutcome};
use crate::config::types::NetworkProfile;

/// JSON body of a link request, as the provisioning service expects it.
#[derive(Debug, Serialize)]
struct LinkRequest<'a> {
    remote_room_server: &'a str,
    remote_room_channel: &'a str,
    matrix_room_id: &'a str,
    op_nick: &'a str,
    user_id: &'a str,
}

/// Issues link requests to a network's provisioning endpoint.
///
/// A provisioning call has a real-world side effect (it can page a human
/// IRC operator), so it is issued exactly once per confirmed attempt and
/// never retried here.
pub struct ProvisioningClient {
    http: reqwest::Client,
}

impl ProvisioningClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Submit one link request. Success iff the service answers HTTP 200;
    /// on any other status the raw body is carried back for the operator.
    pub async fn provision_link(
        &self,
        profile: &NetworkProfile,
        request: &PlumbRequest,
        requesting_user: &str,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let body = LinkRequest {
            remote_room_server: &profile.remote_server,
            remote_room_channel: &request.channel,
            matrix_room_id: &request.room_id,
            op_nick: &request.op_nick,
            user_id: requesting_user,
        };

        info!(
            url = %profile.provisioning_url,
            channel = %request.channel,
            room_id = %request.room_id,
            "Requesting bridge link"
        );

        let response = self
            .http
            .post(&profile.provisioning_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 {
            info!(channel = %request.channel, "Provisioning succeeded");
            Ok(ProvisionOutcome::Linked)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Provisioning failed");
            Ok(ProvisionOutcome::Failed { body })
        }
    }
}

impl Default for ProvisioningClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile(url: String) -> NetworkProfile {
        NetworkProfile {
            name: "ircnet".to_string(),
            bot_user_id: "@ircnet:irc.snt.utwente.nl".to_string(),
            provisioning_url: url,
            remote_server: "irc.snt.utwente.nl".to_string(),
            nick_pattern: r"@_ircnet_(.*):irc\.snt\.utwente\.nl".to_string(),
        }
    }

    fn request() -> PlumbRequest {
        PlumbRequest {
            room_id: "!r:x".to_string(),
            channel: "#c".to_string(),
            op_nick: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_exactly_once_with_all_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ircnet/provision/link"))
            .and(header("content-type", "application/json"))
            .and(body_json_string(
                r##"{
                    "remote_room_server": "irc.snt.utwente.nl",
                    "remote_room_channel": "#c",
                    "matrix_room_id": "!r:x",
                    "op_nick": "alice",
                    "user_id": "@op:x"
                }"##,
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ProvisioningClient::new();
        let outcome = client
            .provision_link(
                &profile(format!("{}/ircnet/provision/link", server.uri())),
                &request(),
                "@op:x",
            )
            .await
            .unwrap();

        assert!(outcome.is_linked());
    }

    #[tokio::test]
    async fn test_non_200_carries_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ProvisioningClient::new();
        let outcome = client
            .provision_link(&profile(server.uri()), &request(), "@op:x")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ProvisionOutcome::Failed {
                body: "server error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_201_is_not_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&server)
            .await;

        let client = ProvisioningClient::new();
        let outcome = client
            .provision_link(&profile(server.uri()), &request(), "@op:x")
            .await
            .unwrap();

        assert!(!outcome.is_linked());
    }
}
