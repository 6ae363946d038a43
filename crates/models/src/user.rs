use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub normalized_email: String,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Credentials,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Credentials => Entity::has_one(crate::user_credentials::Entity).into(),
        }
    }
}

impl Related<crate::user_credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credentials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lookup key for an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ModelError::Validation("invalid email".into()));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation("invalid email".into()));
    }
    if email.len() > 255 {
        return Err(ModelError::Validation("email too long (<=255)".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.chars().count() > 128 { return Err(ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::NormalizedEmail.eq(normalize_email(email)))
        .one(db)
        .await?;
    Ok(found)
}

pub async fn create<C: ConnectionTrait>(db: &C, email: &str, name: &str) -> Result<Model, ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.trim().to_string()),
        normalized_email: Set(normalize_email(email)),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}
