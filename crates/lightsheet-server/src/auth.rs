//! Credential resolution and session tokens.
//!
//! Login exchanges a username/password pair for an opaque session token
//! (a UUID); bearer requests resolve that token back to an [`Identity`]
//! through an in-process session map. The token scheme is deliberately
//! hidden behind this service so it can be swapped (signed tokens,
//! external sessions) without touching the handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use lightsheet_shared::Identity;
use lightsheet_store::StoreError;

use crate::api::SharedDb;
use crate::error::ServerError;

/// Issues and resolves session tokens backed by the user table.
#[derive(Clone)]
pub struct AuthService {
    db: SharedDb,
    /// token -> username
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl AuthService {
    pub fn new(db: SharedDb) -> Self {
        Self {
            db,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check a username/password pair and issue a session token.
    ///
    /// Failures surface as [`ServerError::Rejected`] (HTTP 400), and the
    /// message never reveals whether the username exists.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ServerError> {
        let record = {
            let db = self.db.lock().await;
            db.get_user(username).map_err(|e| match e {
                StoreError::NotFound => {
                    ServerError::Rejected("Incorrect username or password".to_string())
                }
                other => ServerError::Internal(other.to_string()),
            })?
        };

        // Constant-time comparison to avoid leaking the prefix length.
        let given = password.as_bytes();
        let expected = record.password.as_bytes();
        if given.len() != expected.len() || given.ct_eq(expected).unwrap_u8() != 1 {
            debug!(user = username, "rejected login");
            return Err(ServerError::Rejected(
                "Incorrect username or password".to_string(),
            ));
        }

        let token = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), record.username.clone());

        info!(user = username, "issued session token");
        Ok(token)
    }

    /// Resolve a session token to an identity, without the disabled check.
    pub async fn resolve(&self, token: &str) -> Result<Identity, ServerError> {
        let username = {
            let sessions = self.sessions.read().await;
            sessions.get(token).cloned()
        }
        .ok_or_else(|| {
            ServerError::Unauthorized("Invalid authentication credentials".to_string())
        })?;

        let db = self.db.lock().await;
        let record = db.get_user(&username).map_err(|e| match e {
            StoreError::NotFound => {
                ServerError::Unauthorized("Invalid authentication credentials".to_string())
            }
            other => ServerError::Internal(other.to_string()),
        })?;
        Ok(Identity::from(&record))
    }

    /// Resolve a bearer header to a non-disabled identity. This is the
    /// gate every write operation goes through.
    pub async fn resolve_active(&self, headers: &HeaderMap) -> Result<Identity, ServerError> {
        let token = bearer_token(headers)?;
        let identity = self.resolve(token).await?;
        if identity.disabled {
            return Err(ServerError::Forbidden("Inactive user".to_string()));
        }
        Ok(identity)
    }
}

/// Extract the token from an `Authorization: Bearer ...` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ServerError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ServerError::Unauthorized("Missing authorization header".to_string())
        })?;

    auth.strip_prefix("Bearer ").ok_or_else(|| {
        ServerError::Unauthorized("Expected bearer authorization".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightsheet_store::{Database, UserRecord};
    use tokio::sync::Mutex;

    fn service_with_user(name: &str, password: &str, disabled: bool) -> (AuthService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        db.insert_user(&UserRecord {
            username: name.to_string(),
            password: password.to_string(),
            disabled,
        })
        .unwrap();
        (AuthService::new(Arc::new(Mutex::new(db))), dir)
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn login_then_resolve() {
        let (auth, _dir) = service_with_user("alice", "hunter2", false);

        let token = auth.login("alice", "hunter2").await.unwrap();
        let identity = auth.resolve_active(&bearer_headers(&token)).await.unwrap();
        assert_eq!(identity.username, "alice");
        assert!(!identity.disabled);
    }

    #[tokio::test]
    async fn wrong_password_rejected() {
        let (auth, _dir) = service_with_user("alice", "hunter2", false);
        assert!(auth.login("alice", "hunter3").await.is_err());
        assert!(auth.login("alice", "hunter22").await.is_err());
    }

    #[tokio::test]
    async fn unknown_user_rejected() {
        let (auth, _dir) = service_with_user("alice", "hunter2", false);
        assert!(auth.login("ghost", "hunter2").await.is_err());
    }

    #[tokio::test]
    async fn login_rejection_is_bad_request_not_unauthorized() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let (auth, _dir) = service_with_user("alice", "hunter2", false);

        // Bad credentials on login render 400, like the API this replaces.
        let err = auth.login("alice", "wrong").await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = auth.login("ghost", "hunter2").await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        // A bad bearer token is a different failure and stays 401.
        let err = auth.resolve("no-such-token").await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn disabled_user_cannot_write() {
        let (auth, _dir) = service_with_user("mallory", "pw", true);

        let token = auth.login("mallory", "pw").await.unwrap();
        let err = auth
            .resolve_active(&bearer_headers(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Forbidden(_)));
    }

    #[tokio::test]
    async fn malformed_header_rejected() {
        let (auth, _dir) = service_with_user("alice", "hunter2", false);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert!(auth.resolve_active(&headers).await.is_err());
        assert!(auth.resolve_active(&HeaderMap::new()).await.is_err());
    }
}
