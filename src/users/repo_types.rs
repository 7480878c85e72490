use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String, // bcrypt, never leaves the service
    pub full_name: Option<String>,
    pub created_at: OffsetDateTime,
    pub is_active: bool,
}

/// Fields supplied by the caller on insert; the database assigns `id`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Public shape of a user, as returned by login and lookup.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_active: bool,
}

impl From<User> for UserRecord {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            created_at: u.created_at,
            is_active: u.is_active,
        }
    }
}
