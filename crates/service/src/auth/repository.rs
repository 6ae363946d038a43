use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, NewUser};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
///
/// Email lookups are case-insensitive; `create_user` stores the user and its
/// credentials together and reports a taken email as [`AuthError::Conflict`].
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, new_user: NewUser) -> Result<AuthUser, AuthError>;
    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use models::user::normalize_email;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,   // key: normalized email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        pub fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        /// Seed a user with no credentials row.
        pub fn insert_user_without_credentials(&self, email: &str, name: &str) -> AuthUser {
            let user = AuthUser { id: Uuid::new_v4(), email: email.to_string(), name: name.to_string() };
            self.users.lock().unwrap().insert(normalize_email(email), user.clone());
            user
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&normalize_email(email)).cloned())
        }

        async fn create_user(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
            let key = normalize_email(&new_user.email);
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&key) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser { id: Uuid::new_v4(), email: new_user.email.trim().to_string(), name: new_user.name };
            users.insert(key, user.clone());
            self.creds.lock().unwrap().insert(
                user.id,
                Credentials { user_id: user.id, password_hash: new_user.password_hash, password_algorithm: new_user.password_algorithm },
            );
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
