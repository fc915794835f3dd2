//! HTTP client for the Matrix client-server API.
//!
//! Only the handful of endpoints the tool needs: password login, full-state
//! sync, invite, text message send and leave. Every sync is a full-state
//! round-trip so snapshots are rebuilt wholesale, never merged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::common::error::{MatrixError, MatrixResult};
use crate::common::types::RoomSnapshot;
use crate::matrix::types::SyncResponse;

/// Narrow surface of the messaging network consumed by the workflows.
#[async_trait]
pub trait MatrixApi: Send + Sync {
    /// One full-state sync round-trip; returns the complete snapshot set.
    async fn sync(&self) -> MatrixResult<Vec<RoomSnapshot>>;

    /// Invite a user into a room. Rejections come back as
    /// [`MatrixError::InviteRejected`] so callers can treat them as
    /// non-fatal.
    async fn invite(&self, room_id: &str, user_id: &str) -> MatrixResult<()>;

    /// Send a plain-text `m.room.message` into a room.
    async fn send_text(&self, room_id: &str, body: &str) -> MatrixResult<()>;

    /// Leave a room.
    async fn leave(&self, room_id: &str) -> MatrixResult<()>;
}

/// Authenticated session against one homeserver.
#[derive(Debug, Clone)]
pub struct Session {
    pub homeserver: String,
    pub user_id: String,
    pub access_token: String,
}

/// `MatrixApi` implementation over reqwest.
pub struct HttpMatrixClient {
    http: reqwest::Client,
    homeserver: String,
    access_token: String,
    txn_counter: AtomicU64,
    txn_prefix: u64,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user_id: String,
}

impl HttpMatrixClient {
    pub fn new(session: Session) -> Self {
        let txn_prefix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            http: reqwest::Client::new(),
            homeserver: session.homeserver,
            access_token: session.access_token,
            txn_counter: AtomicU64::new(0),
            txn_prefix,
        }
    }

    /// Password login; returns a session whose token can be cached.
    pub async fn login(
        homeserver: &str,
        user: &str,
        password: &str,
    ) -> MatrixResult<Session> {
        let url = format!("{}/_matrix/client/r0/login", homeserver);
        let body = json!({
            "type": "m.login.password",
            "identifier": { "type": "m.id.user", "user": user },
            "password": password,
        });

        let response = reqwest::Client::new().post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::LoginFailed {
                status: status.as_u16(),
                body,
            });
        }

        let login: LoginResponse = response.json().await?;
        Ok(Session {
            homeserver: homeserver.to_string(),
            user_id: login.user_id,
            access_token: login.access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/_matrix/client/r0{}", self.homeserver, path)
    }

    fn next_txn_id(&self) -> String {
        let n = self.txn_counter.fetch_add(1, Ordering::Relaxed);
        format!("mxplumb-{}-{}", self.txn_prefix, n)
    }
}

#[async_trait]
impl MatrixApi for HttpMatrixClient {
    async fn sync(&self) -> MatrixResult<Vec<RoomSnapshot>> {
        let url = self.url("/sync");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("full_state", "true"), ("timeout", "0")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }

        let sync: SyncResponse = response.json().await?;
        let snapshots = sync.into_snapshots();
        debug!(rooms = snapshots.len(), "Sync complete");
        Ok(snapshots)
    }

    async fn invite(&self, room_id: &str, user_id: &str) -> MatrixResult<()> {
        let url = self.url(&format!("/rooms/{}/invite", urlencoding::encode(room_id)));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "user_id": user_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::InviteRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn send_text(&self, room_id: &str, body: &str) -> MatrixResult<()> {
        let url = self.url(&format!(
            "/rooms/{}/send/m.room.message/{}",
            urlencoding::encode(room_id),
            self.next_txn_id()
        ));
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "msgtype": "m.text", "body": body }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::SendRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn leave(&self, room_id: &str) -> MatrixResult<()> {
        let url = self.url(&format!("/rooms/{}/leave", urlencoding::encode(room_id)));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatrixError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpMatrixClient {
        HttpMatrixClient::new(Session {
            homeserver: server.uri(),
            user_id: "@op:x".to_string(),
            access_token: "tok".to_string(),
        })
    }

    #[tokio::test]
    async fn test_sync_parses_rooms() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_matrix/client/r0/sync"))
            .and(query_param("full_state", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{ "rooms": { "join": { "!r:x": { "state": { "events": [
                    { "type": "m.room.member", "state_key": "@a:x",
                      "content": { "membership": "join" } }
                ] } } } } }"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let rooms = client_for(&server).sync().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].members, vec!["@a:x"]);
    }

    #[tokio::test]
    async fn test_sync_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_matrix/client/r0/sync"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server).sync().await.unwrap_err();
        match err {
            MatrixError::UnexpectedResponse { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invite_rejection_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_matrix/client/r0/rooms/%21r%3Ax/invite"))
            .and(body_json_string(r#"{"user_id":"@bot:x"}"#))
            .respond_with(ResponseTemplate::new(403).set_body_string("not allowed"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .invite("!r:x", "@bot:x")
            .await
            .unwrap_err();
        match err {
            MatrixError::InviteRejected { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "not allowed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_text_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(header("content-type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"event_id":"$e"}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_text("!d:x", "!cmd MODE #chan +o alice")
            .await
            .unwrap();
    }

    #[test]
    fn test_room_id_path_encoding() {
        assert_eq!(urlencoding::encode("!r:x"), "%21r%3Ax");
        assert_eq!(urlencoding::encode("abc-123"), "abc-123");
    }
}
