use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, NewUser};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, email: u.email, name: u.name }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email).await?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        let created = models::user::create(&txn, &new_user.email, &new_user.name).await?;
        models::user_credentials::create(&txn, created.id, new_user.password_hash, &new_user.password_algorithm).await?;
        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id).await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn create_and_find_case_insensitive() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };
        let repo = SeaOrmAuthRepository { db };

        let email = format!("Repo_{}@Example.com", Uuid::new_v4());
        let created = repo
            .create_user(NewUser { email: email.clone(), name: "Repo".into(), password_hash: "$argon2id$stub".into(), password_algorithm: "argon2".into() })
            .await?;
        let found = repo.find_user_by_email(&email.to_lowercase()).await?.expect("user present");
        assert_eq!(found, created);

        let creds = repo.get_credentials(created.id).await?.expect("credentials present");
        assert_eq!(creds.password_algorithm, "argon2");

        let dup = repo
            .create_user(NewUser { email: email.to_uppercase(), name: "Dup".into(), password_hash: "$argon2id$stub".into(), password_algorithm: "argon2".into() })
            .await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
        Ok(())
    }
}
