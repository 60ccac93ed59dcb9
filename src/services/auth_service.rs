use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, AuthError, Claims, JwtError, JwtKeys};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserInfo,
}

/// Registration, login, token verification and password changes.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    keys: JwtKeys,
    bcrypt_cost: u32,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, keys: JwtKeys, bcrypt_cost: u32) -> Self {
        Self {
            store,
            keys,
            bcrypt_cost,
        }
    }

    pub async fn register(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<UserInfo, AuthError> {
        let (Some(username), Some(password)) = (present(username), present(password)) else {
            return Err(AuthError::MissingCredentials("Username and password are required"));
        };

        if self.store.find_user_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let hash = hash_password(password, self.bcrypt_cost).await?;

        // A concurrent registration can still win the race; the unique index decides
        let user = match self.store.insert_user(&username, &hash).await {
            Ok(user) => user,
            Err(DatabaseError::UniqueViolation(_)) => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(e.into()),
        };

        info!("Registered user '{}' (id {})", user.username, user.id);
        Ok(UserInfo {
            id: user.id,
            username: user.username,
        })
    }

    /// Unknown user and wrong password produce the same error.
    pub async fn login(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<LoginResult, AuthError> {
        let (Some(username), Some(password)) = (present(username), present(password)) else {
            return Err(AuthError::MissingCredentials("Username and password are required"));
        };

        let Some(user) = self.store.find_user_by_username(&username).await? else {
            warn!("Login failed for unknown user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, user.password_hash.clone()).await? {
            warn!("Login failed for user '{}': password mismatch", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.issue(user.id, &user.username)?;
        info!("User '{}' logged in", user.username);

        Ok(LoginResult {
            token,
            user: UserInfo {
                id: user.id,
                username: user.username,
            },
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.keys.verify(token)
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: Option<String>,
        new_password: Option<String>,
    ) -> Result<(), AuthError> {
        let (Some(old_password), Some(new_password)) = (present(old_password), present(new_password))
        else {
            return Err(AuthError::MissingCredentials("Old and new password are required"));
        };

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(old_password, user.password_hash).await? {
            warn!("Password change rejected for user id {}: wrong old password", user_id);
            return Err(AuthError::WrongPassword);
        }

        let hash = hash_password(new_password, self.bcrypt_cost).await?;
        if !self.store.update_password(user_id, &hash).await? {
            return Err(AuthError::UserNotFound);
        }

        info!("Password changed for user id {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn service(store: &MemoryStore) -> AuthService {
        AuthService::new(Arc::new(store.clone()), JwtKeys::new(b"test-secret", 8), 4)
    }

    #[tokio::test]
    async fn register_twice_is_conflict() {
        let store = MemoryStore::new();
        let auth = service(&store);

        auth.register(Some("alice".into()), Some("pw".into())).await.unwrap();
        let err = auth
            .register(Some("alice".into()), Some("other".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn register_requires_both_fields() {
        let auth = service(&MemoryStore::new());
        let err = auth.register(Some("alice".into()), Some(String::new())).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials(_)));
        let err = auth.register(None, Some("pw".into())).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials(_)));
    }

    #[tokio::test]
    async fn register_stores_a_hash_not_the_password() {
        let store = MemoryStore::new();
        service(&store)
            .register(Some("alice".into()), Some("pw".into()))
            .await
            .unwrap();
        let hash = store.password_hash("alice").unwrap();
        assert_ne!(hash, "pw");
        assert!(hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let auth = service(&MemoryStore::new());
        let user = auth.register(Some("alice".into()), Some("pw".into())).await.unwrap();

        let result = auth.login(Some("alice".into()), Some("pw".into())).await.unwrap();
        assert_eq!(result.user.id, user.id);

        let claims = auth.verify_token(&result.token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn unknown_user_and_bad_password_look_the_same() {
        let auth = service(&MemoryStore::new());
        auth.register(Some("alice".into()), Some("pw".into())).await.unwrap();

        let unknown = auth.login(Some("bob".into()), Some("pw".into())).await.unwrap_err();
        let mismatch = auth.login(Some("alice".into()), Some("nope".into())).await.unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(mismatch, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), mismatch.to_string());
    }

    #[tokio::test]
    async fn wrong_old_password_keeps_hash() {
        let store = MemoryStore::new();
        let auth = service(&store);
        let user = auth.register(Some("alice".into()), Some("pw".into())).await.unwrap();
        let before = store.password_hash("alice").unwrap();

        let err = auth
            .change_password(user.id, Some("wrong".into()), Some("new".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
        assert_eq!(store.password_hash("alice").unwrap(), before);
    }

    #[tokio::test]
    async fn change_password_replaces_login_secret() {
        let auth = service(&MemoryStore::new());
        let user = auth.register(Some("alice".into()), Some("pw".into())).await.unwrap();

        auth.change_password(user.id, Some("pw".into()), Some("new".into()))
            .await
            .unwrap();

        assert!(auth.login(Some("alice".into()), Some("pw".into())).await.is_err());
        assert!(auth.login(Some("alice".into()), Some("new".into())).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_for_missing_user() {
        let auth = service(&MemoryStore::new());
        let err = auth
            .change_password(42, Some("a".into()), Some("b".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
